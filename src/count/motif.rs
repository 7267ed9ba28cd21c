use bio::alphabets::dna;
use regex::bytes::Regex;

use crate::runtime::Error;

/// Which strands of a read are searched for the motif
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StrandMode {
    /// Only the motif as given
    #[default]
    Forward,
    /// Motif or its reverse complement reaches the cutoff
    Either,
    /// Motif and its reverse complement both reach the cutoff
    Both,
}

///////////////////////////////
/// A motif compiled for repeated scanning of read sequences.
///
/// Occurrences are counted left to right without overlap: after a hit, the
/// scan resumes after the end of the hit. "AA" is therefore found twice in "AAAA".
/// Matching is case-sensitive.
#[derive(Clone, Debug)]
pub struct PatternMatcher {
    motif: String,
    forward: Regex,
    reverse: Option<Regex>,
    strand: StrandMode,
}

impl PatternMatcher {
    pub fn new(motif: &str, strand: StrandMode) -> Result<PatternMatcher, Error> {
        if motif.is_empty() {
            return Err(Error::EmptyMotif);
        }
        if !motif.is_ascii() {
            return Err(Error::invalid_motif(motif, Some("only ASCII nucleotides are supported")));
        }

        let forward = compile_literal(motif)?;

        //A palindromic motif is its own reverse complement; no need to scan twice
        let reverse = match strand {
            StrandMode::Forward => None,
            StrandMode::Either | StrandMode::Both => {
                let rc = reverse_complement(motif);
                if rc == motif {
                    None
                } else {
                    Some(compile_literal(&rc)?)
                }
            }
        };

        Ok(PatternMatcher {
            motif: motif.to_string(),
            forward,
            reverse,
            strand,
        })
    }

    pub fn motif(&self) -> &str {
        &self.motif
    }

    pub fn strand(&self) -> StrandMode {
        self.strand
    }

    /// Number of non-overlapping occurrences of the motif in the sequence
    pub fn count_occurrences(&self, sequence: &[u8]) -> usize {
        self.forward.find_iter(sequence).count()
    }

    /// Number of non-overlapping occurrences of the reverse complement, if it is searched
    pub fn count_reverse_occurrences(&self, sequence: &[u8]) -> Option<usize> {
        self.reverse
            .as_ref()
            .map(|reverse| reverse.find_iter(sequence).count())
    }

    /// Whether the sequence holds at least `cutoff` occurrences, according to the strand mode.
    /// A cutoff of 0 is met by every sequence.
    pub fn meets_cutoff(&self, sequence: &[u8], cutoff: usize) -> bool {
        let forward = reaches_cutoff(&self.forward, sequence, cutoff);
        match (&self.reverse, self.strand) {
            (None, _) | (Some(_), StrandMode::Forward) => forward,
            (Some(reverse), StrandMode::Either) => {
                forward || reaches_cutoff(reverse, sequence, cutoff)
            }
            (Some(reverse), StrandMode::Both) => {
                forward && reaches_cutoff(reverse, sequence, cutoff)
            }
        }
    }
}

/// Reverse complement of a motif. A<->T and C<->G; other IUPAC codes map to their complement
pub fn reverse_complement(motif: &str) -> String {
    String::from_utf8_lossy(&dna::revcomp(motif.as_bytes())).into_owned()
}

fn compile_literal(motif: &str) -> Result<Regex, Error> {
    Regex::new(&regex::escape(motif)).map_err(|e| Error::invalid_motif(motif, Some(e.to_string())))
}

/// Stops scanning as soon as the cutoff has been reached
fn reaches_cutoff(re: &Regex, sequence: &[u8], cutoff: usize) -> bool {
    re.find_iter(sequence).take(cutoff).count() == cutoff
}
