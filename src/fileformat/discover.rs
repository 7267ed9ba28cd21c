use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::debug;
use walkdir::WalkDir;

use crate::runtime::Error;

/// Extensions recognised as alignment files when searching a directory
pub const ALIGNMENT_EXTENSIONS: [&str; 2] = ["bam", "cram"];

/// Cell Ranger ATAC places the filtered barcodes of each sample here
pub const ALLOW_LIST_DIR: &str = "filtered_peak_bc_matrix";
pub const ALLOW_LIST_NAMES: [&str; 2] = ["barcodes.tsv", "barcodes.tsv.gz"];

/// A single file is used as is. A directory is searched recursively for
/// alignment files, sorted by path so that reruns see the same order
pub fn find_alignment_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let files = find_files(path, |p| {
        p.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ALIGNMENT_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    })?;

    if files.is_empty() {
        return Err(Error::NoInputs {
            path: path.to_path_buf(),
        }
        .into());
    }
    debug!("Found {} alignment files under {}", files.len(), path.display());
    Ok(files)
}

/// A single file is used as is. A directory is searched recursively for
/// filtered_peak_bc_matrix/barcodes.tsv(.gz), sorted by path
pub fn find_allow_list_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let files = find_files(path, is_allow_list)?;
    debug!("Found {} barcode files under {}", files.len(), path.display());
    Ok(files)
}

fn is_allow_list(path: &Path) -> bool {
    let named = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| ALLOW_LIST_NAMES.contains(&name))
        .unwrap_or(false);
    let in_dir = path
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|dir| dir == ALLOW_LIST_DIR)
        .unwrap_or(false);
    named && in_dir
}

fn find_files<F>(path: &Path, keep: F) -> anyhow::Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(Error::file_not_found(path).into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files.into_iter().sorted().collect())
}
