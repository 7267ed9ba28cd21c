use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::{debug, info};
use rust_htslib::bam;
use rust_htslib::bam::Read;

use super::aggregator::{BarcodeMode, CellAggregator, FileResult};
use super::classifier::{AlignedRead, ReadClassifier};
use super::histogram::OccurrenceHistogram;
use super::motif::PatternMatcher;
use super::params::RunConfiguration;
use crate::runtime::Error;

/// Progress is reported every this many records
pub const PROGRESS_INTERVAL: u64 = 10_000_000;

/// Called with the file being processed and the number of records seen so far
pub type ProgressFn = dyn Fn(&Path, u64) + Send + Sync;

/// Progress callback used by the command line
pub fn log_progress(path: &Path, records: u64) {
    info!(
        "Reads processed: {} M in {}",
        records / 1_000_000,
        path.display()
    );
}

///////////////////////////////
/// Counting state for one file while its records stream past
pub struct FileCounter<'a> {
    classifier: &'a ReadClassifier,
    aggregator: CellAggregator,
    missed_reads: u64,
    records: u64,
}

impl<'a> FileCounter<'a> {
    pub fn new(classifier: &'a ReadClassifier, mode: &BarcodeMode) -> FileCounter<'a> {
        FileCounter {
            classifier,
            aggregator: CellAggregator::new(mode),
            missed_reads: 0,
            records: 0,
        }
    }

    pub fn observe<R: AlignedRead>(&mut self, read: &R) {
        self.records += 1;
        if !self.classifier.classify_into(read, &mut self.aggregator) {
            self.missed_reads += 1;
        }
    }

    pub fn finish(self) -> FileResult {
        FileResult {
            cell_counts: self.aggregator.finish(),
            missed_reads: self.missed_reads,
            records: self.records,
        }
    }
}

///////////////////////////////
/// Runs the classification over all records of one alignment file
#[derive(Clone)]
pub struct FileProcessor {
    classifier: ReadClassifier,
    hts_threads: Option<usize>,
    progress: Option<Arc<ProgressFn>>,
}

impl FileProcessor {
    pub fn new(config: &RunConfiguration) -> Result<FileProcessor, Error> {
        config.validate()?;
        let matcher = PatternMatcher::new(&config.motif, config.strand)?;
        Ok(FileProcessor {
            classifier: ReadClassifier::new(matcher, config.cutoff, &config.barcode_tag),
            hts_threads: config.hts_threads,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: Arc<ProgressFn>) -> FileProcessor {
        self.progress = Some(progress);
        self
    }

    pub fn classifier(&self) -> &ReadClassifier {
        &self.classifier
    }

    /// Count all records of a BAM/SAM/CRAM file. Failing to open or read the
    /// file fails the whole file; no partial result is returned
    pub fn process(&self, path: &Path, mode: &BarcodeMode) -> anyhow::Result<FileResult> {
        let mut counter = FileCounter::new(&self.classifier, mode);
        self.for_each_record(path, |record| counter.observe(record))?;
        let result = counter.finish();

        debug!(
            "{}: {} records, {} cells, {} missed",
            path.display(),
            result.records,
            result.cell_counts.len(),
            result.missed_reads
        );
        Ok(result)
    }

    /// Same as process(), for records that come from somewhere else than a file.
    /// The first error ends the pass
    pub fn process_reads<R, E, I>(
        &self,
        source: &Path,
        reads: I,
        mode: &BarcodeMode,
    ) -> Result<FileResult, E>
    where
        R: AlignedRead,
        I: IntoIterator<Item = Result<R, E>>,
    {
        let mut counter = FileCounter::new(&self.classifier, mode);
        for read in reads {
            counter.observe(&read?);
            self.report_progress(source, counter.records);
        }
        Ok(counter.finish())
    }

    /// Histogram of motif occurrences per read for one file
    pub fn histogram(&self, path: &Path) -> anyhow::Result<OccurrenceHistogram> {
        let matcher = self.classifier.matcher();
        let mut histogram = OccurrenceHistogram::default();
        self.for_each_record(path, |record| histogram.observe(matcher, record))?;
        Ok(histogram)
    }

    /// Stream every record of the file through f, reusing one record buffer
    fn for_each_record<F>(&self, path: &Path, mut f: F) -> anyhow::Result<u64>
    where
        F: FnMut(&bam::Record),
    {
        let mut bam =
            bam::Reader::from_path(path).map_err(|e| Error::alignment_file_open(path, e))?;

        if let Some(hts_threads) = self.hts_threads {
            bam.set_threads(hts_threads)
                .with_context(|| format!("Could not set reader threads for {}", path.display()))?;
        }

        let mut record = bam::Record::new();
        let mut num_records = 0;
        while let Some(r) = bam.read(&mut record) {
            r.with_context(|| {
                format!(
                    "Failed to read record {} of {}",
                    num_records + 1,
                    path.display()
                )
            })?;
            f(&record);

            num_records += 1;
            self.report_progress(path, num_records);
        }
        Ok(num_records)
    }

    fn report_progress(&self, path: &Path, records: u64) {
        if records % PROGRESS_INTERVAL == 0 {
            if let Some(progress) = &self.progress {
                progress(path, records);
            }
        }
    }
}
