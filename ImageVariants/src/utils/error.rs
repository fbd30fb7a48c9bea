//! Error types for image variant processing
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No file provided")]
    NoFileProvided,

    #[error("File is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid size ladder: {0}")]
    InvalidLadder(String),

    #[error("Invalid file path")]
    InvalidPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VariantError {
    /// HTTP-style status for the upload caller.
    ///
    /// Caller misuse and bad input are client errors; storage and encoder
    /// trouble is on our side.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoFileProvided
            | Self::UnsupportedFormat(_)
            | Self::Decode(_)
            | Self::InvalidPath => 400,
            Self::FileTooLarge { .. } => 413,
            _ => 500,
        }
    }

    /// Whether the failure is attributable to the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, VariantError>;
