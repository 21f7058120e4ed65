use std::path::PathBuf;

use thiserror::Error;

/// Pipeline-level error type.
///
/// Only an unreadable input is fatal. Every extraction stage past the
/// document-read boundary degrades to partial, lower-confidence results
/// instead of raising; per-entry parse failures are treated as "field
/// not found" for that entry only.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Input too large: {size} bytes (limit {limit})")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
