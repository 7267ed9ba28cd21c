use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use log::info;

use super::determine_worker_count;
use crate::count::{log_progress, pair_inputs, BatchOrchestrator, FileProcessor, RunConfiguration};
use crate::fileformat::{
    check_distinct_outputs, find_alignment_files, histogram_paths, write_histogram,
};

#[derive(Args)]
pub struct CountKmersCMD {
    /// BAM/CRAM file, or a directory searched recursively for them
    #[arg(short = 'i', long = "input_folder", value_parser)]
    pub path_in: PathBuf,

    /// Directory to store the histograms in
    #[arg(short = 'o', long = "output_folder", value_parser)]
    pub path_out: PathBuf,

    /// Motif to count
    #[arg(short = 'p', long = "pattern")]
    pub pattern: String,

    //Thread settings
    /// Number of files processed at the same time
    #[arg(short = '@', long = "threads", value_parser = clap::value_parser!(usize))]
    pub num_threads: Option<usize>,
}

impl CountKmersCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        let config = RunConfiguration {
            motif: self.pattern.clone(),
            parallelism: determine_worker_count(self.num_threads)?,
            ..Default::default()
        };

        let jobs = pair_inputs(find_alignment_files(&self.path_in)?, None)?;
        check_distinct_outputs(jobs.iter().map(|job| job.input.as_path()), |input| {
            histogram_paths(&self.path_out, &config.motif, input).0
        })?;
        fs::create_dir_all(&self.path_out)?;

        let processor = FileProcessor::new(&config)?.with_progress(Arc::new(log_progress));
        let orchestrator = BatchOrchestrator::new(processor, config.parallelism)?;

        info!(
            "Counting kmers with pattern {} in files listed in {}...",
            config.motif,
            self.path_in.display()
        );
        let report = orchestrator.run_histograms(&jobs, |job, histogram| {
            write_histogram(&self.path_out, &config.motif, &job.input, &histogram)
        });
        report.into_result()?;

        info!(
            "Counting of kmers done! Look for files in {}.",
            self.path_out.display()
        );
        Ok(())
    }
}
