//! Feed error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a rate feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// File is missing or has no content.
    #[error("Rate file does not exist or it is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    /// Line layout does not match header/detail/trailer structure.
    #[error("Improper file format: {0}")]
    Format(String),

    /// Header line could not be parsed.
    #[error("Improper header: {0}")]
    Header(String),

    /// Trailer line could not be parsed.
    #[error("Improper trailer: {0}")]
    Trailer(String),

    /// Trailer count disagrees with the number of detail lines.
    #[error("Number of data records ({actual}) does not match with trailer ({expected})")]
    RecordCount { expected: u32, actual: usize },

    /// JSON import document could not be decoded.
    #[error("Invalid import document: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
