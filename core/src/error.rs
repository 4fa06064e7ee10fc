use std::path::PathBuf;
use thiserror::Error;

/// Result type for radiocohort operations
pub type Result<T> = std::result::Result<T, RadiomicsError>;

/// Error types for radiocohort operations
#[derive(Error, Debug)]
pub enum RadiomicsError {
    /// Volume file is not a readable MGH/MGZ volume
    #[error("Invalid volume {}: {}", .path.display(), .reason)]
    InvalidVolume { path: PathBuf, reason: String },

    /// Volume stores voxels in a type we cannot read
    #[error("Unsupported MGH data type code {0}")]
    UnsupportedDataType(i32),

    /// Required column absent from a table
    #[error("Missing column '{}' in {}", .column, .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Feature extractor failed or produced unusable output
    #[error("Extractor error: {0}")]
    ExtractorError(String),

    /// Master path is not a directory
    #[error("{} is not a valid directory", .0.display())]
    NotADirectory(PathBuf),

    /// No patient yielded a usable feature table
    #[error("No valid features.csv files found under {}", .0.display())]
    NoValidFiles(PathBuf),

    /// Bad configuration value or file
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV reading or writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// NIfTI export error
    #[error("NIfTI error: {0}")]
    NiftiError(#[from] nifti::NiftiError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for RadiomicsError {
    fn from(s: String) -> Self {
        RadiomicsError::ExtractorError(s)
    }
}

impl From<&str> for RadiomicsError {
    fn from(s: &str) -> Self {
        RadiomicsError::ExtractorError(s.to_string())
    }
}

impl From<tempfile::PersistError> for RadiomicsError {
    fn from(e: tempfile::PersistError) -> Self {
        RadiomicsError::IoError(e.error)
    }
}
