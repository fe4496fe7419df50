//! exrate Rate Engine
//!
//! Maintains the current snapshot of exchange rates against a configured
//! base currency and converts amounts between any two stored currencies.
//!
//! # Features
//!
//! - Import of rate feeds quoted against a third-party reference currency,
//!   triangulated through the base currency
//! - Institution rates derived from reference rates with a configurable load
//! - Conversion with per-leg margins and away-from-zero rounding
//! - Atomic snapshot replacement in the in-memory store
//!
//! # Example
//!
//! ```rust,ignore
//! use exrate_fx::{ConversionQuery, RateService, RatesSettings};
//!
//! let service = RateService::in_memory(RatesSettings::from_env())?;
//! service.import_rates(&feed).await?;
//!
//! let result = service.convert(query).await?;
//! println!("{}", result.converted_amount);
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod import;
pub mod margin;
pub mod repository;
pub mod service;

pub use config::RatesSettings;
pub use conversion::{
    validate_request, ConversionRequest, ConversionResult, RateConversionEngine, Validation,
};
pub use error::{FxError, FxResult};
pub use import::{ImportSummary, RateImportEngine, INSTITUTION_MID_LOAD_SIDE};
pub use margin::{apply_load, triangulate};
pub use repository::{InMemoryRateRepository, RateRepository, RateSnapshot};
pub use service::{ConversionQuery, RateService};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::FlakyRateRepository;
