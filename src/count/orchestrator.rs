use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use log::{error, info};

use super::aggregator::{BarcodeMode, FileResult};
use super::histogram::OccurrenceHistogram;
use super::processor::FileProcessor;
use crate::fileformat::read_cell_list_file;
use crate::runtime::Error;

///////////////////////////////
/// One unit of parallel work: an alignment file and, optionally, the barcodes to restrict it to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub allow_list: Option<PathBuf>,
}

impl FileJob {
    pub fn new(input: PathBuf, allow_list: Option<PathBuf>) -> FileJob {
        FileJob { input, allow_list }
    }

    /// Closed universe if an allow-list is paired with this file, open otherwise
    pub fn barcode_mode(&self) -> anyhow::Result<BarcodeMode> {
        match &self.allow_list {
            None => Ok(BarcodeMode::Open),
            Some(path) => Ok(BarcodeMode::Closed(read_cell_list_file(path)?)),
        }
    }
}

/// Pair alignment files with allow-lists by position. Both lists are expected
/// to be sorted already; contents are never compared
pub fn pair_inputs(
    inputs: Vec<PathBuf>,
    allow_lists: Option<Vec<PathBuf>>,
) -> Result<Vec<FileJob>, Error> {
    match allow_lists {
        None => Ok(inputs
            .into_iter()
            .map(|input| FileJob::new(input, None))
            .collect()),
        Some(allow_lists) => {
            if allow_lists.len() != inputs.len() {
                return Err(Error::AllowListCountMismatch {
                    inputs: inputs.len(),
                    allow_lists: allow_lists.len(),
                });
            }
            Ok(inputs
                .into_iter()
                .zip(allow_lists)
                .map(|(input, allow_list)| FileJob::new(input, Some(allow_list)))
                .collect())
        }
    }
}

/// Figures of one finished input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub cells: usize,
    pub matched_reads: u64,
    pub total_reads: u64,
    pub missed_reads: u64,
}

impl From<&FileResult> for FileSummary {
    fn from(result: &FileResult) -> Self {
        FileSummary {
            cells: result.cell_counts.len(),
            matched_reads: result.cell_counts.matched_reads(),
            total_reads: result.cell_counts.total_reads(),
            missed_reads: result.missed_reads,
        }
    }
}

/// A histogram has no cells. Reads with at least one occurrence count as matched
impl From<&OccurrenceHistogram> for FileSummary {
    fn from(histogram: &OccurrenceHistogram) -> Self {
        FileSummary {
            cells: 0,
            matched_reads: histogram
                .counts
                .iter()
                .filter(|(occurrences, _)| **occurrences > 0)
                .map(|(_, &reads)| reads)
                .sum(),
            total_reads: histogram.reads(),
            missed_reads: histogram.missed_reads,
        }
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: anyhow::Result<FileSummary>,
}

impl FileReport {
    pub fn summary(&self) -> Option<&FileSummary> {
        self.outcome.as_ref().ok()
    }
}

///////////////////////////////
/// Per-input outcome of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_err())
    }

    pub fn num_failed(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.num_failed() == 0
    }

    /// Error if any file failed. Results of the other files have been written already
    pub fn into_result(self) -> anyhow::Result<()> {
        let num_failed = self.num_failed();
        if num_failed == 0 {
            return Ok(());
        }
        let failed: Vec<String> = self
            .failed()
            .map(|f| f.input.display().to_string())
            .collect();
        bail!(
            "{} of {} files failed: {}",
            num_failed,
            self.files.len(),
            failed.join(", ")
        )
    }
}

///////////////////////////////
/// Runs one FileProcessor pass per input on a bounded pool of workers.
///
/// Workers share nothing but the read-only processor. Results are sent back to
/// the calling thread, which hands them to the sink one at a time as they
/// complete; a failing file is reported and does not stop the others.
pub struct BatchOrchestrator {
    processor: Arc<FileProcessor>,
    parallelism: usize,
}

impl BatchOrchestrator {
    pub fn new(processor: FileProcessor, parallelism: usize) -> Result<BatchOrchestrator, Error> {
        if parallelism == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(BatchOrchestrator {
            processor: Arc::new(processor),
            parallelism,
        })
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Count cells in every input. The sink receives each FileResult once
    pub fn run<S>(&self, jobs: &[FileJob], sink: S) -> BatchReport
    where
        S: FnMut(&FileJob, FileResult) -> anyhow::Result<()>,
    {
        let processor = Arc::clone(&self.processor);
        self.dispatch(
            jobs,
            move |job: &FileJob| {
                let mode = job.barcode_mode()?;
                processor.process(&job.input, &mode)
            },
            sink,
        )
    }

    /// Motif occurrence histogram for every input. Allow-lists are not used
    pub fn run_histograms<S>(&self, jobs: &[FileJob], sink: S) -> BatchReport
    where
        S: FnMut(&FileJob, OccurrenceHistogram) -> anyhow::Result<()>,
    {
        let processor = Arc::clone(&self.processor);
        self.dispatch(
            jobs,
            move |job: &FileJob| processor.histogram(&job.input),
            sink,
        )
    }

    fn dispatch<T, W, S>(&self, jobs: &[FileJob], work: W, mut sink: S) -> BatchReport
    where
        T: Send + 'static,
        for<'t> FileSummary: From<&'t T>,
        W: Fn(&FileJob) -> anyhow::Result<T> + Send + Sync + 'static,
        S: FnMut(&FileJob, T) -> anyhow::Result<()>,
    {
        let work = Arc::new(work);
        let thread_pool = threadpool::ThreadPool::new(self.parallelism.min(jobs.len()).max(1));

        //Limit how many finished results can wait for the sink
        let (tx, rx) = crossbeam::channel::bounded::<(usize, anyhow::Result<T>)>(self.parallelism);

        for (index, job) in jobs.iter().enumerate() {
            let tx = tx.clone();
            let work = Arc::clone(&work);
            let job = job.clone();
            thread_pool.execute(move || {
                info!("Processing {}", job.input.display());
                let result = work(&job)
                    .with_context(|| format!("Failed to process {}", job.input.display()));
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut outcomes: Vec<Option<anyhow::Result<FileSummary>>> =
            jobs.iter().map(|_| None).collect();
        for (index, result) in rx.iter() {
            let job = &jobs[index];
            let outcome = result.and_then(|value| {
                let summary = FileSummary::from(&value);
                sink(job, value).with_context(|| {
                    format!("Failed to write results for {}", job.input.display())
                })?;
                Ok(summary)
            });
            match &outcome {
                Ok(summary) => info!(
                    "{} done! {} cells, {} of {} counted reads match, {} missed",
                    job.input.display(),
                    summary.cells,
                    summary.matched_reads,
                    summary.total_reads,
                    summary.missed_reads
                ),
                Err(e) => error!("{:#}", e),
            }
            outcomes[index] = Some(outcome);
        }
        thread_pool.join();

        let files = jobs
            .iter()
            .zip(outcomes)
            .map(|(job, outcome)| FileReport {
                input: job.input.clone(),
                outcome: outcome.unwrap_or_else(|| {
                    Err(anyhow!(
                        "Worker for {} stopped without a result",
                        job.input.display()
                    ))
                }),
            })
            .collect();
        BatchReport { files }
    }
}
