//! Currency conversion against the stored snapshot.

use std::sync::Arc;

use exrate_common::{is_valid_rate_side, RateRecord, RateSide};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::RatesSettings;
use crate::error::{FxError, FxResult};
use crate::margin::{apply_load, triangulate};
use crate::repository::RateRepository;

/// Request to convert an amount between two stored currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Amount in the source currency.
    pub amount: Decimal,
    /// Alphabetic source currency code.
    pub source_currency_code: String,
    /// Alphabetic target currency code.
    pub target_currency_code: String,
    /// `BUY` or `SELL`, as supplied.
    pub rate_side: String,
    /// Margin applied when the source is not the base currency.
    #[serde(default)]
    pub base_margin_percent: Decimal,
    /// Margin applied when the target is not the base currency.
    #[serde(default)]
    pub target_margin_percent: Decimal,
    /// Flip the sign of both margins.
    #[serde(default)]
    pub inverse_margin: bool,
}

impl ConversionRequest {
    /// Create a new conversion request with no margins.
    pub fn new(
        amount: Decimal,
        source_currency_code: impl Into<String>,
        target_currency_code: impl Into<String>,
        rate_side: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            source_currency_code: source_currency_code.into(),
            target_currency_code: target_currency_code.into(),
            rate_side: rate_side.into(),
            base_margin_percent: Decimal::ZERO,
            target_margin_percent: Decimal::ZERO,
            inverse_margin: false,
        }
    }

    /// Set base and target margins.
    pub fn with_margins(mut self, base_margin_percent: Decimal, target_margin_percent: Decimal) -> Self {
        self.base_margin_percent = base_margin_percent;
        self.target_margin_percent = target_margin_percent;
        self
    }

    /// Flip the margin sign.
    pub fn with_inverse_margin(mut self, inverse_margin: bool) -> Self {
        self.inverse_margin = inverse_margin;
        self
    }
}

/// The request echoed back with the converted amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    #[serde(flatten)]
    pub request: ConversionRequest,
    pub converted_amount: Decimal,
}

impl ConversionResult {
    fn new(request: ConversionRequest, converted_amount: Decimal) -> Self {
        Self {
            request,
            converted_amount,
        }
    }
}

/// Outcome of request validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Proceed to rate lookup.
    Valid,
    /// Answer immediately with a fixed amount.
    Invalid { converted_amount: Decimal },
}

/// Validate a conversion request. Checks run in order:
///
/// 1. zero amount converts to zero
/// 2. identical currency codes (exact match) convert to the amount itself
/// 3. a side other than BUY/SELL converts to zero
pub fn validate_request(request: &ConversionRequest) -> Validation {
    if request.amount.is_zero() {
        return Validation::Invalid {
            converted_amount: Decimal::ZERO,
        };
    }
    if request.source_currency_code == request.target_currency_code {
        return Validation::Invalid {
            converted_amount: request.amount,
        };
    }
    if !is_valid_rate_side(&request.rate_side) {
        return Validation::Invalid {
            converted_amount: Decimal::ZERO,
        };
    }
    Validation::Valid
}

/// Rate from `source` to `target` on `side`, with per-leg margins applied.
///
/// The base margin applies when the source is not the base currency, the
/// target margin when the target is not.
pub fn conversion_rate(
    source: &RateRecord,
    target: &RateRecord,
    side: RateSide,
    request: &ConversionRequest,
    settings: &RatesSettings,
) -> FxResult<Decimal> {
    let source_rate = source.institution_rate(side);
    let mut rate = triangulate(source_rate, target.institution_rate(side)).ok_or_else(|| {
        if source_rate.is_zero() {
            FxError::ZeroRate {
                currency: source.currency_code.clone(),
                side: side.to_string(),
            }
        } else {
            FxError::Overflow(format!("{} to {}", source.currency_code, target.currency_code))
        }
    })?;

    if !settings.is_base(&request.source_currency_code) {
        rate = apply_load(rate, request.base_margin_percent, side, request.inverse_margin)
            .ok_or_else(|| FxError::Overflow("base margin".to_string()))?;
    }
    if !settings.is_base(&request.target_currency_code) {
        rate = apply_load(rate, request.target_margin_percent, side, request.inverse_margin)
            .ok_or_else(|| FxError::Overflow("target margin".to_string()))?;
    }

    Ok(rate)
}

/// Converts amounts using the rates in a [`RateRepository`].
pub struct RateConversionEngine {
    repository: Arc<dyn RateRepository>,
    settings: Arc<RatesSettings>,
}

impl RateConversionEngine {
    /// Create a new conversion engine.
    pub fn new(repository: Arc<dyn RateRepository>, settings: Arc<RatesSettings>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Convert an amount.
    ///
    /// Requests that fail validation are answered with their fixed amount
    /// and never reach the store. Fails with [`FxError::RateNotFound`]
    /// when either currency has no current record.
    #[instrument(skip(self), fields(
        source = %request.source_currency_code,
        target = %request.target_currency_code,
        side = %request.rate_side
    ))]
    pub async fn convert(&self, request: ConversionRequest) -> FxResult<ConversionResult> {
        if let Validation::Invalid { converted_amount } = validate_request(&request) {
            debug!(converted_amount = %converted_amount, "Answered without rate lookup");
            return Ok(ConversionResult::new(request, converted_amount));
        }

        let source = self.record(&request.source_currency_code).await?;
        let target = self.record(&request.target_currency_code).await?;

        let side = RateSide::parse(&request.rate_side).unwrap_or(RateSide::Mid);
        let rate = conversion_rate(&source, &target, side, &request, &self.settings)?;

        let converted_amount = request
            .amount
            .checked_mul(rate)
            .ok_or_else(|| FxError::Overflow("converted amount".to_string()))?
            .round_dp_with_strategy(
                self.settings.amount_round_decimal_places,
                RoundingStrategy::MidpointAwayFromZero,
            );

        info!(
            rate = %rate,
            converted_amount = %converted_amount,
            "Conversion completed"
        );

        Ok(ConversionResult::new(request, converted_amount))
    }

    async fn record(&self, code: &str) -> FxResult<RateRecord> {
        self.repository
            .get_by_code(&code.to_uppercase())
            .await?
            .ok_or_else(|| FxError::RateNotFound(code.to_string()))
    }
}
