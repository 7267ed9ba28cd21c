pub mod aggregator;
pub mod classifier;
pub mod histogram;
pub mod motif;
pub mod orchestrator;
pub mod params;
pub mod processor;

pub use aggregator::AllowList;
pub use aggregator::BarcodeMode;
pub use aggregator::CellAggregator;
pub use aggregator::CellCount;
pub use aggregator::CellCounts;
pub use aggregator::CellKey;
pub use aggregator::FileResult;

pub use classifier::AlignedRead;
pub use classifier::Classification;
pub use classifier::ReadClassifier;

pub use histogram::OccurrenceHistogram;

pub use motif::reverse_complement;
pub use motif::PatternMatcher;
pub use motif::StrandMode;

pub use orchestrator::pair_inputs;
pub use orchestrator::BatchOrchestrator;
pub use orchestrator::BatchReport;
pub use orchestrator::FileJob;
pub use orchestrator::FileReport;
pub use orchestrator::FileSummary;

pub use params::RunConfiguration;

pub use processor::log_progress;
pub use processor::FileProcessor;
pub use processor::ProgressFn;

#[cfg(test)]
pub(crate) mod testing {
    use super::AlignedRead;

    /// In-memory stand-in for an alignment record
    #[derive(Clone, Debug)]
    pub struct TestRead {
        pub barcode: Option<String>,
        pub sequence: Option<Vec<u8>>,
    }

    impl TestRead {
        pub fn new(barcode: &str, sequence: &str) -> TestRead {
            TestRead {
                barcode: Some(barcode.to_string()),
                sequence: Some(sequence.as_bytes().to_vec()),
            }
        }

        pub fn without_barcode(sequence: &str) -> TestRead {
            TestRead {
                barcode: None,
                sequence: Some(sequence.as_bytes().to_vec()),
            }
        }

        pub fn without_sequence(barcode: &str) -> TestRead {
            TestRead {
                barcode: Some(barcode.to_string()),
                sequence: None,
            }
        }
    }

    impl AlignedRead for TestRead {
        fn barcode(&self, _tag: &[u8]) -> Option<&str> {
            self.barcode.as_deref()
        }

        fn sequence(&self) -> Option<Vec<u8>> {
            self.sequence.clone()
        }
    }
}
