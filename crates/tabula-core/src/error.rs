//! Error types for the tabula document model.

use thiserror::Error;

/// Errors surfaced to callers of the document model.
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("CSV input is empty")]
    EmptyCsv,
}

pub type Result<T> = std::result::Result<T, TabulaError>;
