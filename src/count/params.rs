use super::motif::StrandMode;
use crate::runtime::Error;

pub const DEFAULT_MOTIF: &str = "CCCTAA";
pub const DEFAULT_CUTOFF: usize = 3;
pub const DEFAULT_BARCODE_TAG: &str = "CB";

///////////////////////////////
/// Settings shared by every file of one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfiguration {
    pub motif: String,
    pub cutoff: usize,
    pub strand: StrandMode,
    pub barcode_tag: String,
    /// Number of files processed at the same time
    pub parallelism: usize,
    /// Extra htslib decompression threads per open file
    pub hts_threads: Option<usize>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            motif: DEFAULT_MOTIF.to_string(),
            cutoff: DEFAULT_CUTOFF,
            strand: StrandMode::default(),
            barcode_tag: DEFAULT_BARCODE_TAG.to_string(),
            parallelism: 1,
            hts_threads: None,
        }
    }
}

impl RunConfiguration {
    /// Checks that can be done before touching any file
    pub fn validate(&self) -> Result<(), Error> {
        if self.motif.is_empty() {
            return Err(Error::EmptyMotif);
        }
        if self.barcode_tag.len() != 2 || !self.barcode_tag.is_ascii() {
            return Err(Error::InvalidBarcodeTag {
                tag: self.barcode_tag.clone(),
            });
        }
        if self.parallelism == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RunConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        let empty_motif = RunConfiguration {
            motif: String::new(),
            ..Default::default()
        };
        assert!(matches!(empty_motif.validate(), Err(Error::EmptyMotif)));

        let long_tag = RunConfiguration {
            barcode_tag: "CBX".to_string(),
            ..Default::default()
        };
        assert!(matches!(long_tag.validate(), Err(Error::InvalidBarcodeTag { .. })));

        let no_workers = RunConfiguration {
            parallelism: 0,
            ..Default::default()
        };
        assert!(matches!(no_workers.validate(), Err(Error::NoWorkers)));
    }
}
