//! Rate engine settings.

use std::str::FromStr;

use exrate_common::CurrencyTable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest scale a `Decimal` can hold.
const MAX_DECIMAL_PLACES: u32 = 28;

/// Settings consumed read-only by the import and conversion engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesSettings {
    /// Alphabetic code of the currency all rates are expressed against.
    pub base_currency_code: String,
    /// Numeric code of the base currency.
    pub base_currency_number: u16,
    /// Load percentage applied to reference rates at import time.
    pub initial_load_percentage: Decimal,
    /// Decimal places converted amounts are rounded to.
    pub amount_round_decimal_places: u32,
}

impl Default for RatesSettings {
    fn default() -> Self {
        Self {
            base_currency_code: "EUR".to_string(),
            base_currency_number: 978,
            initial_load_percentage: Decimal::ZERO,
            amount_round_decimal_places: 2,
        }
    }
}

impl RatesSettings {
    /// Load settings from environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(code) = std::env::var("EXRATE_BASE_CURRENCY_CODE") {
            settings.base_currency_code = code.trim().to_string();
        }

        if let Ok(number) = std::env::var("EXRATE_BASE_CURRENCY_NUMBER") {
            if let Ok(number) = number.trim().parse() {
                settings.base_currency_number = number;
            }
        }

        if let Ok(load) = std::env::var("EXRATE_INITIAL_LOAD_PERCENTAGE") {
            if let Ok(load) = Decimal::from_str(load.trim()) {
                settings.initial_load_percentage = load;
            }
        }

        if let Ok(places) = std::env::var("EXRATE_AMOUNT_ROUND_DECIMAL_PLACES") {
            if let Ok(places) = places.trim().parse() {
                settings.amount_round_decimal_places = places;
            }
        }

        settings
    }

    /// Check whether `code` names the base currency (case-insensitive).
    pub fn is_base(&self, code: &str) -> bool {
        self.base_currency_code.eq_ignore_ascii_case(code)
    }

    /// Validate settings against the currency table.
    pub fn validate(&self, currencies: &CurrencyTable) -> Result<(), String> {
        let number = currencies
            .number_of(&self.base_currency_code)
            .map_err(|_| format!("Unknown base currency code {}", self.base_currency_code))?;

        if number != self.base_currency_number {
            return Err(format!(
                "Base currency {} has number {}, not {}",
                self.base_currency_code, number, self.base_currency_number
            ));
        }

        if self.amount_round_decimal_places > MAX_DECIMAL_PLACES {
            return Err(format!(
                "Rounding decimal places cannot exceed {MAX_DECIMAL_PLACES}"
            ));
        }

        if self.initial_load_percentage.is_sign_negative()
            || self.initial_load_percentage >= Decimal::ONE_HUNDRED
        {
            return Err("Initial load percentage must be in [0, 100)".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_settings() {
        let settings = RatesSettings::default();
        assert!(settings.validate(&CurrencyTable::iso4217()).is_ok());
        assert_eq!(settings.base_currency_code, "EUR");
        assert_eq!(settings.amount_round_decimal_places, 2);
    }

    #[test]
    fn test_is_base_ignores_case() {
        let settings = RatesSettings::default();
        assert!(settings.is_base("EUR"));
        assert!(settings.is_base("eur"));
        assert!(!settings.is_base("USD"));
    }

    #[test]
    fn test_invalid_settings() {
        let table = CurrencyTable::iso4217();

        let mismatched = RatesSettings {
            base_currency_number: 840,
            ..Default::default()
        };
        assert!(mismatched.validate(&table).is_err());

        let unknown = RatesSettings {
            base_currency_code: "XYZ".to_string(),
            ..Default::default()
        };
        assert!(unknown.validate(&table).is_err());

        let too_precise = RatesSettings {
            amount_round_decimal_places: 29,
            ..Default::default()
        };
        assert!(too_precise.validate(&table).is_err());

        let negative_load = RatesSettings {
            initial_load_percentage: dec!(-1),
            ..Default::default()
        };
        assert!(negative_load.validate(&table).is_err());

        let full_load = RatesSettings {
            initial_load_percentage: dec!(100),
            ..Default::default()
        };
        assert!(full_load.validate(&table).is_err());
    }
}
