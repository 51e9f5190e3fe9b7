//! Error types for fuelbench

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Parse cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    IoError(String),
}

/// Errors raised while opening or reading a workbook
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Failed to open workbook {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Sheet '{sheet}' could not be read: {reason}")]
    Sheet { sheet: String, reason: String },

    #[error("Sheet '{sheet}' is missing required column: {column}")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
