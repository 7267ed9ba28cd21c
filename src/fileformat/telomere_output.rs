use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::count::{FileResult, OccurrenceHistogram};
use crate::runtime::Error;

/// Cell Ranger keeps the alignments of a sample in `{sample}/outs/`
pub const CELLRANGER_OUTS_DIR: &str = "outs";

/// How per-cell results are laid out on disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputLayout {
    /// Separate barcode,count and barcode,total files, appended to
    #[default]
    Split,
    /// One table per input with count, total and fraction per barcode
    Table,
}

/// Where the results of one input go
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputPaths {
    Split {
        count: PathBuf,
        total: PathBuf,
        missed: PathBuf,
    },
    Table {
        table: PathBuf,
        missed: PathBuf,
    },
}

impl OutputPaths {
    /// Every layout writes a missed report; it identifies the output set of an input
    pub fn missed(&self) -> &Path {
        match self {
            OutputPaths::Split { missed, .. } | OutputPaths::Table { missed, .. } => missed.as_path(),
        }
    }
}

///////////////////////////////
/// Output file naming for telomere counts.
///
/// Without an output directory, files are placed beside the input file. With one,
/// the sample name of the input is prepended: the sample folder for Cell Ranger
/// output (`{sample}/outs/possorted_bam.bam`), the file stem otherwise
#[derive(Clone, Debug)]
pub struct OutputNaming {
    pub motif: String,
    pub output_dir: Option<PathBuf>,
    pub layout: OutputLayout,
}

impl OutputNaming {
    pub fn new(motif: &str, output_dir: Option<PathBuf>, layout: OutputLayout) -> OutputNaming {
        OutputNaming {
            motif: motif.to_string(),
            output_dir,
            layout,
        }
    }

    pub fn paths_for(&self, input: &Path) -> OutputPaths {
        let (dir, prefix) = match &self.output_dir {
            Some(dir) => (dir.clone(), format!("{}_", sample_name(input))),
            None => (
                input
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
                String::new(),
            ),
        };
        let missed = dir.join(format!("{}telomemore_missed.txt", prefix));

        match self.layout {
            OutputLayout::Split => OutputPaths::Split {
                count: dir.join(format!("{}telomemore_count_{}.csv", prefix, self.motif)),
                total: dir.join(format!("{}telomemore_total_{}.csv", prefix, self.motif)),
                missed,
            },
            OutputLayout::Table => OutputPaths::Table {
                table: dir.join(format!("{}telomemore_{}.csv", prefix, self.motif)),
                missed,
            },
        }
    }

    /// Fail if two inputs would write to the same files
    pub fn check_distinct<'a, I>(&self, inputs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        check_distinct_outputs(inputs, |input| self.paths_for(input).missed().to_path_buf())
    }

    /// Write the result of one input
    pub fn write(&self, input: &Path, result: &FileResult) -> anyhow::Result<()> {
        match self.paths_for(input) {
            OutputPaths::Split {
                count,
                total,
                missed,
            } => {
                append_cell_values(&count, result.cell_counts.iter().map(|(bc, c)| (bc, c.matched)))?;
                append_cell_values(&total, result.cell_counts.iter().map(|(bc, c)| (bc, c.total)))?;
                write_missed(&missed, result.missed_reads)
            }
            OutputPaths::Table { table, missed } => {
                write_table(&table, &self.motif, input, result)?;
                write_missed(&missed, result.missed_reads)
            }
        }
    }
}

/// Append barcode,value rows. Several inputs may share the file
pub fn append_cell_values<'a, I>(path: &Path, rows: I) -> anyhow::Result<()>
where
    I: Iterator<Item = (&'a str, u64)>,
{
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open output file {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for (barcode, value) in rows {
        let value = value.to_string();
        writer.write_record([barcode, value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_missed(path: &Path, missed_reads: u64) -> anyhow::Result<()> {
    fs::write(path, format!("Number of missed barcodes = {}\n", missed_reads))
        .with_context(|| format!("Could not write {}", path.display()))
}

#[derive(Serialize)]
struct TableRow<'a> {
    bc: &'a str,
    count: u64,
    total: u64,
    fraction: Option<f64>,
    pattern: &'a str,
    file: &'a str,
}

pub fn write_table(
    path: &Path,
    motif: &str,
    input: &Path,
    result: &FileResult,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Could not create output file {}", path.display()))?;
    let file = input.display().to_string();

    for (bc, count) in result.cell_counts.iter() {
        writer.serialize(TableRow {
            bc,
            count: count.matched,
            total: count.total,
            fraction: count.fraction(),
            pattern: motif,
            file: &file,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Histogram file and missed report of one input, as (histogram, missed)
pub fn histogram_paths(output_dir: &Path, motif: &str, input: &Path) -> (PathBuf, PathBuf) {
    let sample = sample_name(input);
    (
        output_dir.join(format!("{}_{}_kmer.csv", sample, motif)),
        output_dir.join(format!("{}_missed_reads.txt", sample)),
    )
}

///////////////////////////////
/// Histogram of occurrences per read, as `number,count`, plus the unreadable reads
pub fn write_histogram(
    output_dir: &Path,
    motif: &str,
    input: &Path,
    histogram: &OccurrenceHistogram,
) -> anyhow::Result<()> {
    let (path_hist, path_missed) = histogram_paths(output_dir, motif, input);

    let mut writer = csv::Writer::from_path(&path_hist)
        .with_context(|| format!("Could not create output file {}", path_hist.display()))?;
    writer.write_record(["number", "count"])?;
    for (number, count) in &histogram.counts {
        writer.write_record(&[number.to_string(), count.to_string()])?;
    }
    writer.flush()?;

    fs::write(
        &path_missed,
        format!(
            "Reads that could not be read in {}: {}\n",
            input.display(),
            histogram.missed_reads
        ),
    )
    .with_context(|| format!("Could not write {}", path_missed.display()))
}

/// Fail on the first two inputs that map to the same output file
pub fn check_distinct_outputs<'a, I, F>(inputs: I, output_of: F) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a Path>,
    F: Fn(&Path) -> PathBuf,
{
    let mut seen: FxHashMap<PathBuf, &Path> = FxHashMap::default();
    for input in inputs {
        let output = output_of(input);
        if let Some(first) = seen.get(&output) {
            return Err(Error::OutputCollision {
                first: first.to_path_buf(),
                second: input.to_path_buf(),
                output,
            });
        }
        seen.insert(output, input);
    }
    Ok(())
}

/// Name used to prefix the output files of an input
pub fn sample_name(input: &Path) -> String {
    let parent = input.parent();
    let in_outs_dir = parent
        .and_then(Path::file_name)
        .map(|dir| dir == CELLRANGER_OUTS_DIR)
        .unwrap_or(false);
    if in_outs_dir {
        if let Some(sample) = parent.and_then(Path::parent).and_then(Path::file_name) {
            return sample.to_string_lossy().into_owned();
        }
    }
    file_stem(input)
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::{BarcodeMode, CellAggregator};

    fn result() -> FileResult {
        let mode = BarcodeMode::Closed(["AAAC-1", "CCCT-1"].into_iter().collect());
        let mut agg = CellAggregator::new(&mode);
        agg.record("AAAC-1", true);
        agg.record("AAAC-1", false);
        FileResult {
            cell_counts: agg.finish(),
            missed_reads: 7,
            records: 9,
        }
    }

    #[test]
    fn default_naming_is_beside_input() {
        let naming = OutputNaming::new("CCCTAA", None, OutputLayout::Split);
        assert_eq!(
            naming.paths_for(Path::new("/data/s1/outs/possorted_bam.bam")),
            OutputPaths::Split {
                count: "/data/s1/outs/telomemore_count_CCCTAA.csv".into(),
                total: "/data/s1/outs/telomemore_total_CCCTAA.csv".into(),
                missed: "/data/s1/outs/telomemore_missed.txt".into(),
            }
        );
    }

    #[test]
    fn output_dir_naming_uses_stem() {
        let naming = OutputNaming::new("TTAGGG", Some("/out".into()), OutputLayout::Table);
        assert_eq!(
            naming.paths_for(Path::new("/data/s1.bam")),
            OutputPaths::Table {
                table: "/out/s1_telomemore_TTAGGG.csv".into(),
                missed: "/out/s1_telomemore_missed.txt".into(),
            }
        );
    }

    #[test]
    fn cellranger_samples_are_named_by_folder() {
        let naming = OutputNaming::new("CCCTAA", Some("/out".into()), OutputLayout::Table);
        let a = naming.paths_for(Path::new("/data/sampleA/outs/possorted_bam.bam"));
        let b = naming.paths_for(Path::new("/data/sampleB/outs/possorted_bam.bam"));
        assert_eq!(
            a,
            OutputPaths::Table {
                table: "/out/sampleA_telomemore_CCCTAA.csv".into(),
                missed: "/out/sampleA_telomemore_missed.txt".into(),
            }
        );
        assert_ne!(a, b);
        assert!(naming
            .check_distinct([
                Path::new("/data/sampleA/outs/possorted_bam.bam"),
                Path::new("/data/sampleB/outs/possorted_bam.bam"),
            ])
            .is_ok());
    }

    #[test]
    fn inputs_sharing_outputs_are_rejected() {
        let with_dir = OutputNaming::new("CCCTAA", Some("/out".into()), OutputLayout::Split);
        let err = with_dir
            .check_distinct([Path::new("/x/s1.bam"), Path::new("/y/s1.bam")])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OutputCollision { ref output, .. }
                if output == Path::new("/out/s1_telomemore_missed.txt")
        ));

        //Beside the input, two files of one directory share the names
        let beside = OutputNaming::new("CCCTAA", None, OutputLayout::Split);
        assert!(beside
            .check_distinct([Path::new("/x/a.bam"), Path::new("/x/b.bam")])
            .is_err());
        assert!(beside
            .check_distinct([Path::new("/x/a.bam"), Path::new("/y/b.bam")])
            .is_ok());
    }

    #[test]
    fn split_files_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let naming = OutputNaming::new("CCCTAA", Some(dir.path().to_path_buf()), OutputLayout::Split);
        let input = Path::new("s1.bam");

        naming.write(input, &result()).unwrap();
        naming.write(input, &result()).unwrap();

        let count = fs::read_to_string(dir.path().join("s1_telomemore_count_CCCTAA.csv")).unwrap();
        assert_eq!(count, "AAAC-1,1\nCCCT-1,0\nAAAC-1,1\nCCCT-1,0\n");
        let total = fs::read_to_string(dir.path().join("s1_telomemore_total_CCCTAA.csv")).unwrap();
        assert_eq!(total, "AAAC-1,2\nCCCT-1,0\nAAAC-1,2\nCCCT-1,0\n");
        let missed = fs::read_to_string(dir.path().join("s1_telomemore_missed.txt")).unwrap();
        assert_eq!(missed, "Number of missed barcodes = 7\n");
    }

    #[test]
    fn table_has_fraction_column() {
        let dir = tempfile::tempdir().unwrap();
        let naming = OutputNaming::new("CCCTAA", Some(dir.path().to_path_buf()), OutputLayout::Table);
        naming.write(Path::new("s1.bam"), &result()).unwrap();

        let table = fs::read_to_string(dir.path().join("s1_telomemore_CCCTAA.csv")).unwrap();
        assert_eq!(
            table,
            "bc,count,total,fraction,pattern,file\n\
             AAAC-1,1,2,0.5,CCCTAA,s1.bam\n\
             CCCT-1,0,0,,CCCTAA,s1.bam\n"
        );
    }

    #[test]
    fn histogram_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut histogram = OccurrenceHistogram::default();
        histogram.counts.insert(0, 10);
        histogram.counts.insert(3, 2);
        histogram.missed_reads = 1;

        write_histogram(dir.path(), "TTAGGG", Path::new("x/s1.bam"), &histogram).unwrap();

        let hist = fs::read_to_string(dir.path().join("s1_TTAGGG_kmer.csv")).unwrap();
        assert_eq!(hist, "number,count\n0,10\n3,2\n");
        let missed = fs::read_to_string(dir.path().join("s1_missed_reads.txt")).unwrap();
        assert_eq!(missed, "Reads that could not be read in x/s1.bam: 1\n");
    }
}
