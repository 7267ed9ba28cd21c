use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use log::{info, warn};

use super::{available_workers, determine_worker_count};
use crate::count::params::{DEFAULT_BARCODE_TAG, DEFAULT_CUTOFF, DEFAULT_MOTIF};
use crate::count::{
    log_progress, pair_inputs, BatchOrchestrator, FileProcessor, RunConfiguration, StrandMode,
};
use crate::fileformat::{find_alignment_files, find_allow_list_files, OutputLayout, OutputNaming};

#[derive(Args)]
pub struct CountTelomeresCMD {
    /// BAM/CRAM file, or a directory searched recursively for them
    #[arg(short = 'i', long = "inputs", value_parser)]
    pub path_in: PathBuf,

    /// Motif to search the reads for
    #[arg(short = 'p', long = "pattern", default_value = DEFAULT_MOTIF)]
    pub pattern: String,

    /// Barcode file, or a directory searched for filtered_peak_bc_matrix/barcodes.tsv.
    /// Paired with the inputs by sorted position
    #[arg(short = 'b', long = "barcodes", visible_alias = "bc", value_parser)]
    pub path_barcodes: Option<PathBuf>,

    /// Minimum occurrences of the motif for a read to count as a telomere read
    #[arg(short = 'c', long = "cutoff", default_value_t = DEFAULT_CUTOFF)]
    pub cutoff: usize,

    /// Output directory. By default, results are written beside each input file
    #[arg(short = 'o', long = "output", value_parser)]
    pub path_out: Option<PathBuf>,

    /// Also search for the reverse complement of the motif
    #[arg(long = "strand", value_enum, default_value_t = StrandMode::Forward)]
    pub strand: StrandMode,

    /// SAM tag holding the cell barcode
    #[arg(long = "barcode-tag", default_value = DEFAULT_BARCODE_TAG)]
    pub barcode_tag: String,

    /// Separate count/total files, or one table per input
    #[arg(long = "layout", value_enum, default_value_t = OutputLayout::Split)]
    pub layout: OutputLayout,

    /// Extra decompression threads for each open file
    #[arg(long = "hts-threads", value_parser = clap::value_parser!(usize))]
    pub hts_threads: Option<usize>,

    //Thread settings
    /// Number of files processed at the same time
    #[arg(short = '@', long = "threads", value_parser = clap::value_parser!(usize))]
    pub num_threads: Option<usize>,
}

impl CountTelomeresCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        let num_workers = determine_worker_count(self.num_threads)?;
        if num_workers > available_workers() {
            warn!(
                "Using {} workers on a machine with {} cores",
                num_workers,
                available_workers()
            );
        }

        let config = RunConfiguration {
            motif: self.pattern.clone(),
            cutoff: self.cutoff,
            strand: self.strand,
            barcode_tag: self.barcode_tag.clone(),
            parallelism: num_workers,
            hts_threads: self.hts_threads,
        };
        config.validate()?;

        let inputs = find_alignment_files(&self.path_in)?;
        let allow_lists = match &self.path_barcodes {
            Some(path) => Some(find_allow_list_files(path)?),
            None => None,
        };
        let jobs = pair_inputs(inputs, allow_lists)?;

        let naming = OutputNaming::new(&config.motif, self.path_out.clone(), self.layout);
        naming.check_distinct(jobs.iter().map(|job| job.input.as_path()))?;

        if let Some(path_out) = &self.path_out {
            fs::create_dir_all(path_out)?;
        }

        let processor = FileProcessor::new(&config)?.with_progress(Arc::new(log_progress));
        let orchestrator = BatchOrchestrator::new(processor, config.parallelism)?;

        info!(
            "Counting telomeres with pattern {} (cutoff {}) in {} files using {} workers",
            config.motif,
            config.cutoff,
            jobs.len(),
            orchestrator.parallelism()
        );
        let report = orchestrator.run(&jobs, |job, result| naming.write(&job.input, &result));
        report.into_result()?;

        info!("Counting of telomeres done!");
        Ok(())
    }
}
