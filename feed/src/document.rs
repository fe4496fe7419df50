//! JSON import document.
//!
//! This is the structure posted to the rate import: a header carrying the
//! effective date, one detail record per currency quoted against the
//! reference currency, and an optional trailer.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FeedResult;

/// A complete rate import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateFeed {
    /// Header with the effective date.
    #[serde(default)]
    pub header: Option<FeedHeader>,
    /// One entry per quoted currency.
    #[serde(default)]
    pub detail_records: Vec<DetailRecord>,
    /// Record count and hash. Accepted but not checked by the engine.
    #[serde(default, deserialize_with = "lenient")]
    pub trailer: Option<TrailerRecord>,
}

impl RateFeed {
    /// Decode an import document.
    pub fn from_json(contents: &str) -> FeedResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Find the detail record for a numeric currency code.
    pub fn detail_for(&self, currency_number: u16) -> Option<&DetailRecord> {
        self.detail_records
            .iter()
            .find(|detail| detail.source_currency_number == currency_number)
    }
}

/// Feed header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedHeader {
    /// Effective date of the rates, e.g. `2017-10-21 14:00:19`.
    pub date: String,
}

/// Conversion rates of one currency against the reference currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// ISO 4217 numeric code of the quoted currency.
    #[serde(rename = "source_currency_code")]
    pub source_currency_number: u16,
    /// Minor unit exponent of the quoted currency.
    pub source_currency_exponent: u8,
    /// Buy rate against the reference currency.
    pub buy_currency_conversion_rate: Decimal,
    /// Mid rate against the reference currency.
    pub mid_currency_conversion_rate: Decimal,
    /// Sell rate against the reference currency.
    pub sell_currency_conversion_rate: Decimal,
}

/// Feed trailer.
///
/// Fields that are missing or do not decode are left empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerRecord {
    /// Number of detail records in the source file.
    #[serde(default, deserialize_with = "lenient")]
    pub total_records: Option<u32>,
    /// Hash total of the source file.
    #[serde(default, deserialize_with = "lenient")]
    pub hash_total: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
