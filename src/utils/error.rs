// src/utils/error.rs
use thiserror::Error;

// Fatal errors only. "Section not found" style outcomes are reported inside
// ExtractionResult (see extractors::report), never through these types.

/// Failures of the document-to-block conversion boundary.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("Converter returned HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("No converter configured for document: {0}")]
    NoConverter(String),

    #[error("Failed to parse converter output: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error while reading field sets: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid field-set catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field set '{id}': {reason}")]
    InvalidFieldSet { id: String, reason: String },

    #[error("Duplicate field set id: {0}")]
    DuplicateId(String),

    #[error("Unknown extraction target: {0}")]
    UnknownTarget(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: String, value: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction task failed: {0}")]
    Task(String),
}
