//! Error types for currency lookups.

use thiserror::Error;

/// Errors raised by the currency table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Code or number missing from the table. The table is authoritative,
    /// so this means the table itself needs updating.
    #[error("Currency not found: {0}")]
    NotFound(String),

    /// Caller supplied something that is neither a known code nor a known number.
    #[error("Provided currency: {0} is not the valid one.")]
    InvalidArgument(String),
}

impl CurrencyError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrencyError::NotFound(_) => "CURRENCY_NOT_FOUND",
            CurrencyError::InvalidArgument(_) => "INVALID_CURRENCY",
        }
    }

    /// Check if the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CurrencyError::InvalidArgument(_))
    }
}

/// Result type alias for currency lookups.
pub type Result<T> = std::result::Result<T, CurrencyError>;
