use std::collections::BTreeMap;

use super::classifier::AlignedRead;
use super::motif::PatternMatcher;

///////////////////////////////
/// How many reads of a file carry the motif 0, 1, 2, ... times.
/// Only the sequence is looked at; barcodes play no role here
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccurrenceHistogram {
    /// occurrences per read -> number of reads
    pub counts: BTreeMap<usize, u64>,
    /// Records without a sequence
    pub missed_reads: u64,
}

impl OccurrenceHistogram {
    pub fn observe<R: AlignedRead>(&mut self, matcher: &PatternMatcher, read: &R) {
        match read.sequence() {
            Some(sequence) => {
                *self
                    .counts
                    .entry(matcher.count_occurrences(&sequence))
                    .or_insert(0) += 1;
            }
            None => self.missed_reads += 1,
        }
    }

    /// Number of reads with a sequence
    pub fn reads(&self) -> u64 {
        self.counts.values().sum()
    }
}
