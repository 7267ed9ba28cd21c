use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Context;
use flate2::read::MultiGzDecoder;

use crate::count::AllowList;
use crate::runtime::Error;

/// Read a list of cell barcodes: one per line, tab-delimited, no header.
/// Only the first column is used. Files ending in .gz are decompressed
pub fn read_cell_list_file(path: &Path) -> anyhow::Result<AllowList> {
    if !path.is_file() {
        return Err(Error::file_not_found(path).into());
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open file with list of cells {}", path.display()))?;

    let is_gz = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let list = if is_gz {
        parse_cell_list(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        parse_cell_list(BufReader::new(file))
    };
    list.map_err(|e| Error::file_not_valid(path, Some(format!("{:#}", e))).into())
}

/// Parse barcodes from any reader. Blank lines are skipped
pub fn parse_cell_list<R: Read>(reader: R) -> anyhow::Result<AllowList> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut barcodes = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(barcode) = record.get(0).map(str::trim) {
            if !barcode.is_empty() {
                barcodes.push(barcode.to_string());
            }
        }
    }
    Ok(barcodes.into_iter().collect())
}
