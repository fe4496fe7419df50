//! Caller-facing rate service.
//!
//! Wraps the import and conversion engines behind the request surface
//! exposed to clients: currency arguments may be codes or numeric codes,
//! the side may be in any case and the amount may be negative.

use std::sync::Arc;

use exrate_common::{is_valid_rate_side, CurrencyTable, RateRecord};
use exrate_feed::RateFeed;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::RatesSettings;
use crate::conversion::{ConversionRequest, ConversionResult, RateConversionEngine};
use crate::error::{FxError, FxResult};
use crate::import::{ImportSummary, RateImportEngine};
use crate::repository::{InMemoryRateRepository, RateRepository};

const INVALID_SOURCE: &str = "Provided source currency is not valid.";
const INVALID_TARGET: &str = "Provided target currency is not valid.";
const INVALID_RATE_SIDE: &str = "Provided rate type is not valid.";
const UNSUPPORTED_CURRENCY: &str = "Unsupported base or target currency";

/// Raw conversion query as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionQuery {
    /// Amount to convert. The sign is ignored.
    pub amount: Decimal,
    /// Source currency, alphabetic or numeric code.
    pub source_currency: String,
    /// Target currency, alphabetic or numeric code.
    pub target_currency: String,
    /// `BUY` or `SELL` in any case.
    pub rate_side: String,
    #[serde(default)]
    pub base_margin_percent: Option<Decimal>,
    #[serde(default)]
    pub target_margin_percent: Option<Decimal>,
    #[serde(default)]
    pub inverse_margin: Option<bool>,
}

/// Rate service over a rate store.
pub struct RateService {
    repository: Arc<dyn RateRepository>,
    currencies: Arc<CurrencyTable>,
    importer: RateImportEngine,
    converter: RateConversionEngine,
}

impl RateService {
    /// Create a new service. Fails when `settings` are inconsistent with
    /// the currency table.
    pub fn new(
        repository: Arc<dyn RateRepository>,
        currencies: Arc<CurrencyTable>,
        settings: RatesSettings,
    ) -> FxResult<Self> {
        settings.validate(&currencies).map_err(FxError::Configuration)?;
        let settings = Arc::new(settings);

        Ok(Self {
            importer: RateImportEngine::new(repository.clone(), currencies.clone(), settings.clone()),
            converter: RateConversionEngine::new(repository.clone(), settings),
            repository,
            currencies,
        })
    }

    /// Service over an empty in-memory store and the ISO 4217 table.
    pub fn in_memory(settings: RatesSettings) -> FxResult<Self> {
        Self::new(
            Arc::new(InMemoryRateRepository::new()),
            Arc::new(CurrencyTable::iso4217()),
            settings,
        )
    }

    /// Current snapshot, ordered by currency code.
    pub async fn get_all_rates(&self) -> FxResult<Vec<RateRecord>> {
        self.repository.get_all().await
    }

    /// Replace the snapshot with the rates of `feed`.
    pub async fn import_rates(&self, feed: &RateFeed) -> FxResult<ImportSummary> {
        self.importer.import(feed).await
    }

    /// Convert an amount.
    ///
    /// Unknown currencies or sides fail with [`FxError::InvalidArgument`].
    /// Currencies the snapshot does not carry fail with
    /// [`FxError::UnsupportedCurrency`].
    #[instrument(skip(self))]
    pub async fn convert(&self, query: ConversionQuery) -> FxResult<ConversionResult> {
        let request = self.to_request(&query)?;

        match self.converter.convert(request).await {
            Err(FxError::RateNotFound(code)) => {
                warn!(currency = %code, "No current rate for currency");
                Err(FxError::UnsupportedCurrency(UNSUPPORTED_CURRENCY.to_string()))
            }
            other => other,
        }
    }

    /// Validate a query and canonicalise it into a [`ConversionRequest`].
    pub fn to_request(&self, query: &ConversionQuery) -> FxResult<ConversionRequest> {
        if !self.currencies.is_valid(&query.source_currency) {
            return Err(FxError::InvalidArgument(INVALID_SOURCE.to_string()));
        }
        if !self.currencies.is_valid(&query.target_currency) {
            return Err(FxError::InvalidArgument(INVALID_TARGET.to_string()));
        }
        if !is_valid_rate_side(&query.rate_side) {
            return Err(FxError::InvalidArgument(INVALID_RATE_SIDE.to_string()));
        }

        let source = self.currencies.code_of_str(&query.source_currency)?;
        let target = self.currencies.code_of_str(&query.target_currency)?;

        Ok(ConversionRequest::new(
            query.amount.abs(),
            source,
            target,
            query.rate_side.to_uppercase(),
        )
        .with_margins(
            query.base_margin_percent.unwrap_or_default(),
            query.target_margin_percent.unwrap_or_default(),
        )
        .with_inverse_margin(query.inverse_margin.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exrate_feed::{DetailRecord, FeedHeader};
    use rust_decimal_macros::dec;

    fn query(amount: Decimal, source: &str, target: &str, side: &str) -> ConversionQuery {
        ConversionQuery {
            amount,
            source_currency: source.to_string(),
            target_currency: target.to_string(),
            rate_side: side.to_string(),
            base_margin_percent: None,
            target_margin_percent: None,
            inverse_margin: None,
        }
    }

    fn detail(number: u16, rate: Decimal) -> DetailRecord {
        DetailRecord {
            source_currency_number: number,
            source_currency_exponent: 2,
            buy_currency_conversion_rate: rate,
            mid_currency_conversion_rate: rate,
            sell_currency_conversion_rate: rate,
        }
    }

    async fn service() -> RateService {
        let service = RateService::in_memory(RatesSettings::default()).unwrap();
        service
            .import_rates(&RateFeed {
                header: Some(FeedHeader {
                    date: "2017-10-21 14:00:19".to_string(),
                }),
                detail_records: vec![detail(978, dec!(1.25)), detail(840, dec!(1))],
                trailer: None,
            })
            .await
            .unwrap();
        service
    }

    #[test]
    fn test_rejects_inconsistent_settings() {
        let settings = RatesSettings {
            base_currency_number: 840,
            ..Default::default()
        };
        assert!(matches!(
            RateService::in_memory(settings),
            Err(FxError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_get_all_rates() {
        let service = service().await;
        let codes: Vec<String> = service
            .get_all_rates()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.currency_code)
            .collect();
        assert_eq!(codes, vec!["EUR", "USD"]);
    }

    #[tokio::test]
    async fn test_to_request_canonicalises() {
        let service = service().await;
        let mut q = query(dec!(-10), "840", " 978 ", "sell");
        q.base_margin_percent = Some(dec!(2));

        let request = service.to_request(&q).unwrap();

        assert_eq!(request.amount, dec!(10));
        assert_eq!(request.source_currency_code, "USD");
        assert_eq!(request.target_currency_code, "EUR");
        assert_eq!(request.rate_side, "SELL");
        assert_eq!(request.base_margin_percent, dec!(2));
        assert_eq!(request.target_margin_percent, dec!(0));
        assert!(!request.inverse_margin);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let service = service().await;

        let err = service.convert(query(dec!(1), "TEST", "EUR", "BUY")).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_SOURCE);

        let err = service.convert(query(dec!(1), "EUR", "1133dafdas13", "BUY")).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_TARGET);

        let err = service.convert(query(dec!(1), "EUR", "USD", "mid")).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_RATE_SIDE);
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unsupported_currency() {
        let service = service().await;

        let err = service.convert(query(dec!(1), "EUR", "JPY", "BUY")).await.unwrap_err();

        assert!(matches!(err, FxError::UnsupportedCurrency(_)));
        assert_eq!(err.to_string(), UNSUPPORTED_CURRENCY);
    }

    #[tokio::test]
    async fn test_convert_by_number() {
        let service = service().await;

        // USD reference rate is (1 / 1) * 1.25.
        let result = service.convert(query(dec!(-4), "978", "840", "buy")).await.unwrap();

        assert_eq!(result.request.amount, dec!(4));
        assert_eq!(result.converted_amount, dec!(5.00));
    }

    #[tokio::test]
    async fn test_same_currency_after_canonicalisation() {
        let service = service().await;

        let result = service.convert(query(dec!(7), "EUR", "978", "BUY")).await.unwrap();

        assert_eq!(result.converted_amount, dec!(7));
    }
}
