//! Rate sides and the persisted rate record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Timestamp;

/// Which side of a rate record to use.
///
/// Only `Buy` and `Sell` can be requested by callers. `Mid` is used
/// internally as the fallback side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RateSide {
    Buy,
    Sell,
    Mid,
}

impl RateSide {
    pub const BUY: &'static str = "BUY";
    pub const SELL: &'static str = "SELL";

    /// Parse a caller-supplied side, case-insensitively. Never yields `Mid`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            Self::BUY => Some(RateSide::Buy),
            Self::SELL => Some(RateSide::Sell),
            _ => None,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSide::Buy => Self::BUY,
            RateSide::Sell => Self::SELL,
            RateSide::Mid => "MID",
        }
    }

    /// Load sign for this side: selling lowers the rate, anything else raises it.
    pub fn load_sign(&self) -> Decimal {
        match self {
            RateSide::Sell => Decimal::NEGATIVE_ONE,
            RateSide::Buy | RateSide::Mid => Decimal::ONE,
        }
    }
}

/// Check whether a caller-supplied rate side is BUY or SELL (any case).
pub fn is_valid_rate_side(value: &str) -> bool {
    RateSide::parse(value).is_some()
}

impl fmt::Display for RateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current rate of one currency against the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// ISO 4217 numeric code.
    pub currency_number: u16,
    /// ISO 4217 alphabetic code.
    pub currency_code: String,
    /// Minor unit exponent.
    pub currency_exponent: u8,
    /// Third-party buy rate against the base currency.
    pub reference_buy_rate: Decimal,
    /// Third-party sell rate against the base currency.
    pub reference_sell_rate: Decimal,
    /// Third-party mid rate against the base currency.
    pub reference_mid_rate: Decimal,
    /// Reference buy rate with the institution load applied.
    pub institution_buy_rate: Decimal,
    /// Reference sell rate with the institution load applied.
    pub institution_sell_rate: Decimal,
    /// Reference mid rate with the institution load applied.
    pub institution_mid_rate: Decimal,
    /// Effective date of the snapshot this record belongs to.
    pub validity_date: Timestamp,
}

impl RateRecord {
    /// Record for the base currency: every rate is exactly one.
    pub fn base(
        currency_number: u16,
        currency_code: impl Into<String>,
        currency_exponent: u8,
        validity_date: Timestamp,
    ) -> Self {
        Self {
            currency_number,
            currency_code: currency_code.into(),
            currency_exponent,
            reference_buy_rate: Decimal::ONE,
            reference_sell_rate: Decimal::ONE,
            reference_mid_rate: Decimal::ONE,
            institution_buy_rate: Decimal::ONE,
            institution_sell_rate: Decimal::ONE,
            institution_mid_rate: Decimal::ONE,
            validity_date,
        }
    }

    /// Institution rate for the given side.
    pub fn institution_rate(&self, side: RateSide) -> Decimal {
        match side {
            RateSide::Buy => self.institution_buy_rate,
            RateSide::Sell => self.institution_sell_rate,
            RateSide::Mid => self.institution_mid_rate,
        }
    }

    /// Reference rate for the given side.
    pub fn reference_rate(&self, side: RateSide) -> Decimal {
        match side {
            RateSide::Buy => self.reference_buy_rate,
            RateSide::Sell => self.reference_sell_rate,
            RateSide::Mid => self.reference_mid_rate,
        }
    }
}
