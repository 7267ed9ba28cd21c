use std::fmt;

use clap::Subcommand;

// Module declarations (alphabetical)
pub mod count_kmers;
pub mod count_telomeres;
pub mod threadcount;

pub use count_kmers::CountKmersCMD;
pub use count_telomeres::CountTelomeresCMD;
pub use threadcount::{available_workers, determine_worker_count};

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// Count telomere reads and total reads per cell
    CountTelomeres(CountTelomeresCMD),
    /// Histogram of motif occurrences per read
    CountKmers(CountKmersCMD),
}

impl Commands {
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        match self {
            Commands::CountTelomeres(cmd) => cmd.try_execute(),
            Commands::CountKmers(cmd) => cmd.try_execute(),
        }
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::CountTelomeres(_) => "CountTelomeres",
            Commands::CountKmers(_) => "CountKmers",
        };
        write!(f, "{}", cmd)
    }
}
