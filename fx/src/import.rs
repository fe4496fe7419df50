//! Rate import: triangulates a feed through the base currency and replaces
//! the stored snapshot.

use std::sync::Arc;

use exrate_common::{parse_effective_date, CurrencyTable, RateRecord, RateSide, Timestamp};
use exrate_feed::{DetailRecord, RateFeed};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::RatesSettings;
use crate::error::{FxError, FxResult};
use crate::margin::{apply_load, triangulate};
use crate::repository::RateRepository;

/// Side whose sign convention is used when loading the institution mid rate.
pub const INSTITUTION_MID_LOAD_SIDE: RateSide = RateSide::Buy;

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Correlates the log lines of one import.
    pub import_id: Uuid,
    /// Number of records in the new snapshot.
    pub records: usize,
    /// Effective date shared by every record.
    pub validity_date: Timestamp,
    /// Base currency the rates are expressed against.
    pub base_currency_code: String,
}

/// Imports rate feeds into a [`RateRepository`].
pub struct RateImportEngine {
    repository: Arc<dyn RateRepository>,
    currencies: Arc<CurrencyTable>,
    settings: Arc<RatesSettings>,
}

impl RateImportEngine {
    /// Create a new import engine.
    pub fn new(
        repository: Arc<dyn RateRepository>,
        currencies: Arc<CurrencyTable>,
        settings: Arc<RatesSettings>,
    ) -> Self {
        Self {
            repository,
            currencies,
            settings,
        }
    }

    /// Replace the stored snapshot with the rates of `feed`.
    ///
    /// Fails with [`FxError::MissingBaseCurrency`] without touching the
    /// store when the feed does not quote the base currency. Any later
    /// failure leaves the store empty.
    #[instrument(skip(self, feed), fields(details = feed.detail_records.len()))]
    pub async fn import(&self, feed: &RateFeed) -> FxResult<ImportSummary> {
        let import_id = Uuid::now_v7();

        let base = feed
            .detail_for(self.settings.base_currency_number)
            .ok_or_else(|| FxError::MissingBaseCurrency(self.settings.base_currency_code.clone()))?;

        let (validity_date, records) =
            match build_snapshot(feed, base, &self.currencies, &self.settings) {
                Ok(staged) => staged,
                Err(e) => return Err(self.clear_after_failure(import_id, e).await),
            };
        let count = records.len();

        if let Err(e) = self.repository.replace_all(records).await {
            return Err(self.clear_after_failure(import_id, e).await);
        }

        info!(
            import_id = %import_id,
            records = count,
            validity_date = %validity_date,
            store = self.repository.name(),
            "Imported exchange rates"
        );

        Ok(ImportSummary {
            import_id,
            records: count,
            validity_date,
            base_currency_code: self.settings.base_currency_code.clone(),
        })
    }

    async fn clear_after_failure(&self, import_id: Uuid, cause: FxError) -> FxError {
        error!(import_id = %import_id, error = %cause, "Rate import failed, clearing store");
        if let Err(e) = self.repository.delete_all().await {
            warn!(import_id = %import_id, error = %e, "Failed to clear rate store");
        }
        cause
    }
}

/// Compute every record of a feed, in feed order.
///
/// `base` is the feed's entry for the base currency. Its rates are the
/// multipliers for every other entry on the same side.
pub fn build_snapshot(
    feed: &RateFeed,
    base: &DetailRecord,
    currencies: &CurrencyTable,
    settings: &RatesSettings,
) -> FxResult<(Timestamp, Vec<RateRecord>)> {
    let validity_date = validity_date(feed)?;

    let records = feed
        .detail_records
        .iter()
        .map(|detail| build_record(detail, base, validity_date, currencies, settings))
        .collect::<FxResult<Vec<_>>>()?;

    Ok((validity_date, records))
}

fn validity_date(feed: &RateFeed) -> FxResult<Timestamp> {
    let header = feed
        .header
        .as_ref()
        .ok_or_else(|| FxError::InvalidFeed("missing header".to_string()))?;

    parse_effective_date(&header.date)
        .ok_or_else(|| FxError::InvalidFeed(format!("unparsable header date {}", header.date)))
}

fn build_record(
    detail: &DetailRecord,
    base: &DetailRecord,
    validity_date: Timestamp,
    currencies: &CurrencyTable,
    settings: &RatesSettings,
) -> FxResult<RateRecord> {
    let code = currencies.code_of(detail.source_currency_number)?;

    if settings.is_base(code) {
        return Ok(RateRecord::base(
            detail.source_currency_number,
            code,
            detail.source_currency_exponent,
            validity_date,
        ));
    }

    let reference = |side: RateSide, rate: Decimal, base_rate: Decimal| {
        triangulate(rate, base_rate).ok_or_else(|| {
            if rate.is_zero() {
                FxError::ZeroRate {
                    currency: code.to_string(),
                    side: side.to_string(),
                }
            } else {
                FxError::Overflow(format!("{side} rate for {code}"))
            }
        })
    };
    let load = |rate: Decimal, side: RateSide| {
        apply_load(rate, settings.initial_load_percentage, side, false)
            .ok_or_else(|| FxError::Overflow(format!("loaded {side} rate for {code}")))
    };

    let reference_buy_rate = reference(
        RateSide::Buy,
        detail.buy_currency_conversion_rate,
        base.buy_currency_conversion_rate,
    )?;
    let reference_sell_rate = reference(
        RateSide::Sell,
        detail.sell_currency_conversion_rate,
        base.sell_currency_conversion_rate,
    )?;
    let reference_mid_rate = reference(
        RateSide::Mid,
        detail.mid_currency_conversion_rate,
        base.mid_currency_conversion_rate,
    )?;

    Ok(RateRecord {
        currency_number: detail.source_currency_number,
        currency_code: code.to_string(),
        currency_exponent: detail.source_currency_exponent,
        institution_buy_rate: load(reference_buy_rate, RateSide::Buy)?,
        institution_sell_rate: load(reference_sell_rate, RateSide::Sell)?,
        institution_mid_rate: load(reference_mid_rate, INSTITUTION_MID_LOAD_SIDE)?,
        reference_buy_rate,
        reference_sell_rate,
        reference_mid_rate,
        validity_date,
    })
}
