//! Error types for the data-loader crate.
//!
//! Everything that can go wrong while reading the product catalog or a
//! model artifact from disk ends up here. All of these are fatal at startup.

use thiserror::Error;

/// Errors that can occur while loading the catalog or a model artifact
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record in the data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A row carries more fields than the header declares
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A column the catalog cannot work without is absent from the header
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A model artifact exists but is not usable
    #[error("Invalid model artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
