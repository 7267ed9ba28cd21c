use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("File at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    FileNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Could not open alignment file {:?}", path)]
    AlignmentFileOpen {
        path: std::path::PathBuf,
        #[source]
        source: rust_htslib::errors::Error,
    },

    #[error("No alignment files found under {:?}.", path)]
    NoInputs { path: std::path::PathBuf },

    #[error("The motif must not be empty.")]
    EmptyMotif,

    #[error("Invalid motif '{}'{}.", motif, Error::format_msg_as_detail(msg))]
    InvalidMotif { motif: String, msg: Option<String> },

    #[error("Barcode tag '{}' is not a two-character SAM tag.", tag)]
    InvalidBarcodeTag { tag: String },

    #[error(
        "Found {} alignment files but {} barcode files. Files are paired by position, so the counts must match.",
        inputs,
        allow_lists
    )]
    AllowListCountMismatch { inputs: usize, allow_lists: usize },

    #[error("At least one worker is required.")]
    NoWorkers,

    #[error(
        "Inputs {:?} and {:?} would both write {:?}. Give each input its own sample folder or file name.",
        first,
        second,
        output
    )]
    OutputCollision {
        first: std::path::PathBuf,
        second: std::path::PathBuf,
        output: std::path::PathBuf,
    },
}

impl Error {
    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn file_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FileNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn alignment_file_open<P: AsRef<std::path::Path>>(
        path: P,
        source: rust_htslib::errors::Error,
    ) -> Self {
        Error::AlignmentFileOpen {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[cold]
    pub fn invalid_motif<S: Into<String>, M: Into<String>>(motif: S, msg: Option<M>) -> Self {
        Error::InvalidMotif {
            motif: motif.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}
