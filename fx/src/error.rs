//! Rate engine error types.

use exrate_common::CurrencyError;
use thiserror::Error;

/// Errors that can occur in the rate engine.
#[derive(Debug, Error)]
pub enum FxError {
    /// Currency table lookup failed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Import feed has no entry for the configured base currency.
    #[error("Import exchange rates do not contain data for base currency {0}")]
    MissingBaseCurrency(String),

    /// No current rate record for the currency.
    #[error("Rate not found for currency {0}")]
    RateNotFound(String),

    /// Conversion references a currency the snapshot does not carry.
    #[error("{0}")]
    UnsupportedCurrency(String),

    /// Caller supplied an invalid request value.
    #[error("{0}")]
    InvalidArgument(String),

    /// Import feed is structurally unusable.
    #[error("Invalid rate feed: {0}")]
    InvalidFeed(String),

    /// A rate that must be inverted is zero.
    #[error("Zero {side} rate for currency {currency}")]
    ZeroRate { currency: String, side: String },

    /// Decimal arithmetic left the representable range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Two records share a currency code or number.
    #[error("Duplicate rate record for currency {0}")]
    DuplicateRecord(String),

    /// The rate store failed.
    #[error("Rate store error: {0}")]
    Store(String),

    /// Settings are inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Currency(e) => e.error_code(),
            FxError::MissingBaseCurrency(_) => "MISSING_BASE_CURRENCY",
            FxError::RateNotFound(_) => "RATE_NOT_FOUND",
            FxError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            FxError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FxError::InvalidFeed(_) => "INVALID_FEED",
            FxError::ZeroRate { .. } => "ZERO_RATE",
            FxError::Overflow(_) => "ARITHMETIC_OVERFLOW",
            FxError::DuplicateRecord(_) => "DUPLICATE_RECORD",
            FxError::Store(_) => "STORE_ERROR",
            FxError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Check if the caller is at fault (bad request or bad feed).
    pub fn is_client_error(&self) -> bool {
        match self {
            FxError::Currency(e) => e.is_client_error(),
            FxError::MissingBaseCurrency(_)
            | FxError::RateNotFound(_)
            | FxError::UnsupportedCurrency(_)
            | FxError::InvalidArgument(_)
            | FxError::InvalidFeed(_)
            | FxError::ZeroRate { .. }
            | FxError::DuplicateRecord(_) => true,
            FxError::Overflow(_) | FxError::Store(_) | FxError::Configuration(_) => false,
        }
    }
}

/// Result type for rate engine operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_message_names_currency() {
        let err = FxError::MissingBaseCurrency("EUR".to_string());
        assert_eq!(
            err.to_string(),
            "Import exchange rates do not contain data for base currency EUR"
        );
    }

    #[test]
    fn test_classification() {
        assert!(FxError::UnsupportedCurrency("x".into()).is_client_error());
        assert!(FxError::from(CurrencyError::InvalidArgument("TEST".into())).is_client_error());
        assert!(!FxError::from(CurrencyError::NotFound("999".into())).is_client_error());
        assert!(!FxError::Store("down".into()).is_client_error());
        assert_eq!(FxError::Store("down".into()).error_code(), "STORE_ERROR");
    }
}
