use rust_htslib::bam::record::Aux;
use rust_htslib::bam::Record as BamRecord;

use super::aggregator::CellAggregator;
use super::motif::PatternMatcher;

///////////////////////////////
/// The parts of an alignment record the counting needs
pub trait AlignedRead {
    /// Value of a string-typed tag, or None if absent or of another type
    fn barcode(&self, tag: &[u8]) -> Option<&str>;

    /// Read bases, or None if the record stores no sequence
    fn sequence(&self) -> Option<Vec<u8>>;
}

impl AlignedRead for BamRecord {
    fn barcode(&self, tag: &[u8]) -> Option<&str> {
        match self.aux(tag) {
            Ok(Aux::String(cb)) => Some(cb),
            _ => None,
        }
    }

    fn sequence(&self) -> Option<Vec<u8>> {
        //SEQ is "*"
        if self.seq_len() == 0 {
            None
        } else {
            Some(self.seq().as_bytes())
        }
    }
}

/// Outcome for one read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'r> {
    /// Barcode or sequence missing
    Unreadable,
    Cell { barcode: &'r str, is_match: bool },
}

///////////////////////////////
/// Decides for each read which cell it belongs to and whether it carries the motif
#[derive(Clone, Debug)]
pub struct ReadClassifier {
    matcher: PatternMatcher,
    cutoff: usize,
    barcode_tag: Vec<u8>,
}

impl ReadClassifier {
    pub fn new(matcher: PatternMatcher, cutoff: usize, barcode_tag: &str) -> ReadClassifier {
        ReadClassifier {
            matcher,
            cutoff,
            barcode_tag: barcode_tag.as_bytes().to_vec(),
        }
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    pub fn classify<'r, R: AlignedRead>(&self, read: &'r R) -> Classification<'r> {
        let Some(barcode) = read.barcode(&self.barcode_tag) else {
            return Classification::Unreadable;
        };
        let Some(sequence) = read.sequence() else {
            return Classification::Unreadable;
        };

        Classification::Cell {
            barcode,
            is_match: self.matcher.meets_cutoff(&sequence, self.cutoff),
        }
    }

    /// Classify a read and count it. Returns false if the read was unreadable;
    /// the caller keeps the tally of missed reads
    pub fn classify_into<R: AlignedRead>(&self, read: &R, aggregator: &mut CellAggregator) -> bool {
        match self.classify(read) {
            Classification::Unreadable => false,
            Classification::Cell { barcode, is_match } => {
                aggregator.record(barcode, is_match);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::aggregator::{BarcodeMode, CellCount};
    use crate::count::motif::StrandMode;
    use crate::count::testing::TestRead;

    fn classifier(cutoff: usize) -> ReadClassifier {
        let matcher = PatternMatcher::new("CCCTAA", StrandMode::Forward).unwrap();
        ReadClassifier::new(matcher, cutoff, "CB")
    }

    #[test]
    fn missing_barcode_is_unreadable() {
        let read = TestRead::without_barcode("CCCTAACCCTAACCCTAA");
        assert_eq!(classifier(3).classify(&read), Classification::Unreadable);
    }

    #[test]
    fn missing_sequence_is_unreadable() {
        let read = TestRead::without_sequence("CELL1");
        assert_eq!(classifier(3).classify(&read), Classification::Unreadable);
    }

    #[test]
    fn unreadable_leaves_counts_alone() {
        let mut agg = CellAggregator::new(&BarcodeMode::Open);
        let c = classifier(1);
        assert!(!c.classify_into(&TestRead::without_barcode("CCCTAA"), &mut agg));
        assert!(!c.classify_into(&TestRead::without_sequence("CELL1"), &mut agg));
        assert!(agg.finish().is_empty());
    }

    #[test]
    fn cutoff_boundary() {
        let c = classifier(3);
        let exactly = TestRead::new("CELL1", "CCCTAACCCTAACCCTAA");
        let one_less = TestRead::new("CELL1", "CCCTAACCCTAA");
        assert_eq!(
            c.classify(&exactly),
            Classification::Cell { barcode: "CELL1", is_match: true }
        );
        assert_eq!(
            c.classify(&one_less),
            Classification::Cell { barcode: "CELL1", is_match: false }
        );
    }

    #[test]
    fn zero_cutoff_matches_every_readable_read() {
        let read = TestRead::new("CELL1", "GGGG");
        assert_eq!(
            classifier(0).classify(&read),
            Classification::Cell { barcode: "CELL1", is_match: true }
        );
    }

    #[test]
    fn telomere_read_then_plain_read() {
        let c = classifier(3);
        let mut agg = CellAggregator::new(&BarcodeMode::Open);

        //One earlier read for the cell
        c.classify_into(&TestRead::new("CELL1", "ACGT"), &mut agg);

        c.classify_into(&TestRead::new("CELL1", "CCCTAACCCTAACCCTAAGGG"), &mut agg);
        c.classify_into(&TestRead::new("CELL1", "CCCTAA"), &mut agg);

        assert_eq!(agg.finish().get("CELL1"), Some(&CellCount::new(1, 3)));
    }
}
