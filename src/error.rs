/// Error types for the catalog core
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an import before any row is written
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension is not one of the supported tabular formats
    #[error("Unsupported file extension: {0:?} (expected csv, xlsx, xlsm, xls or ods)")]
    UnsupportedExtension(String),

    /// The source file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The source file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader failed before the first data row
    #[error("CSV error: {0}")]
    Csv(String),

    /// The spreadsheet could not be opened or has no worksheet
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// The source has no header row
    #[error("Source contains no header row")]
    EmptySource,

    /// Required semantic columns could not be matched against the header
    #[error("Could not resolve required columns from header: {}", .0.join(", "))]
    UnresolvedColumns(Vec<String>),
}

/// Errors raised by a catalog store backend or its persistence files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A failure confined to a single imported row
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowError {
    #[error("unreadable row: {0}")]
    Read(String),

    #[error("invalid price amount {0:?}")]
    InvalidPrice(String),

    #[error("store rejected row: {0}")]
    Store(String),
}
