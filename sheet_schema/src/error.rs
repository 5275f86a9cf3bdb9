//! Error types for sheet_schema
//!
//! Only failures that stop an export before it starts live here. Problems
//! found in the sheet data itself are reported as diagnostics instead.

use thiserror::Error;

/// Result type for sheet_schema operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sheet_schema
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Workbook error: {0}")]
    WorkbookError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}

/// Convert Serde JSON errors to sheet_schema errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to sheet_schema errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

/// Convert YAML deserialization errors to sheet_schema errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
