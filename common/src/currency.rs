//! ISO 4217 currency table.
//!
//! Bidirectional mapping between alphabetic currency codes and their
//! numeric codes. The table is built once and shared read-only.

use std::collections::HashMap;

use crate::error::{CurrencyError, Result};

/// Alphabetic code and numeric code of every supported currency.
pub const ISO_4217: &[(&str, u16)] = &[
    ("AFN", 971),
    ("ALL", 8),
    ("DZD", 12),
    ("USD", 840),
    ("EUR", 978),
    ("AOA", 973),
    ("XCD", 951),
    ("ARS", 32),
    ("AMD", 51),
    ("AWG", 533),
    ("AUD", 36),
    ("AZN", 944),
    ("BSD", 44),
    ("BHD", 48),
    ("BDT", 50),
    ("BBD", 52),
    ("BYN", 933),
    ("BZD", 84),
    ("XOF", 952),
    ("BMD", 60),
    ("BTN", 64),
    ("INR", 356),
    ("BOB", 68),
    ("BOV", 984),
    ("BAM", 977),
    ("BWP", 72),
    ("NOK", 578),
    ("BRL", 986),
    ("BND", 96),
    ("BGN", 975),
    ("BIF", 108),
    ("CVE", 132),
    ("KHR", 116),
    ("XAF", 950),
    ("CAD", 124),
    ("KYD", 136),
    ("CLF", 990),
    ("CLP", 152),
    ("CNY", 156),
    ("COP", 170),
    ("COU", 970),
    ("KMF", 174),
    ("CDF", 976),
    ("NZD", 554),
    ("CRC", 188),
    ("HRK", 191),
    ("CUC", 931),
    ("CUP", 192),
    ("ANG", 532),
    ("CZK", 203),
    ("DKK", 208),
    ("DJF", 262),
    ("DOP", 214),
    ("EGP", 818),
    ("SVC", 222),
    ("ERN", 232),
    ("ETB", 230),
    ("FKP", 238),
    ("FJD", 242),
    ("XPF", 953),
    ("GMD", 270),
    ("GEL", 981),
    ("GHS", 936),
    ("GIP", 292),
    ("GTQ", 320),
    ("GBP", 826),
    ("GNF", 324),
    ("GYD", 328),
    ("HTG", 332),
    ("HNL", 340),
    ("HKD", 344),
    ("HUF", 348),
    ("ISK", 352),
    ("IDR", 360),
    ("XDR", 960),
    ("IRR", 364),
    ("IQD", 368),
    ("ILS", 376),
    ("JMD", 388),
    ("JPY", 392),
    ("JOD", 400),
    ("KZT", 398),
    ("KES", 404),
    ("KPW", 408),
    ("KRW", 410),
    ("KWD", 414),
    ("KGS", 417),
    ("LAK", 418),
    ("LBP", 422),
    ("LSL", 426),
    ("ZAR", 710),
    ("LRD", 430),
    ("LYD", 434),
    ("CHF", 756),
    ("MOP", 446),
    ("MGA", 969),
    ("MWK", 454),
    ("MYR", 458),
    ("MVR", 462),
    ("MRU", 929),
    ("MUR", 480),
    ("XUA", 965),
    ("MXN", 484),
    ("MXV", 979),
    ("MDL", 498),
    ("MNT", 496),
    ("MAD", 504),
    ("MZN", 943),
    ("MMK", 104),
    ("NAD", 516),
    ("NPR", 524),
    ("NIO", 558),
    ("NGN", 566),
    ("OMR", 512),
    ("PKR", 586),
    ("PAB", 590),
    ("PGK", 598),
    ("PYG", 600),
    ("PEN", 604),
    ("PHP", 608),
    ("PLN", 985),
    ("QAR", 634),
    ("MKD", 807),
    ("RON", 946),
    ("RUB", 643),
    ("RWF", 646),
    ("SHP", 654),
    ("WST", 882),
    ("STN", 930),
    ("SAR", 682),
    ("RSD", 941),
    ("SCR", 690),
    ("SLE", 925),
    ("SGD", 702),
    ("XSU", 994),
    ("SBD", 90),
    ("SOS", 706),
    ("SSP", 728),
    ("LKR", 144),
    ("SDG", 938),
    ("SRD", 968),
    ("SZL", 748),
    ("SEK", 752),
    ("CHE", 947),
    ("CHW", 948),
    ("SYP", 760),
    ("TWD", 901),
    ("TJS", 972),
    ("TZS", 834),
    ("THB", 764),
    ("TOP", 776),
    ("TTD", 780),
    ("TND", 788),
    ("TRY", 949),
    ("TMT", 934),
    ("UGX", 800),
    ("UAH", 980),
    ("AED", 784),
    ("USN", 997),
    ("UYI", 940),
    ("UYU", 858),
    ("UZS", 860),
    ("VUV", 548),
    ("VEF", 937),
    ("VED", 926),
    ("VND", 704),
    ("YER", 886),
    ("ZMW", 967),
    ("ZWL", 932),
    ("MRO", 478),
    ("STD", 678),
    ("SLL", 694),
    ("BYR", 974),
];

/// Immutable code/number lookup.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    code_to_number: HashMap<&'static str, u16>,
    number_to_code: HashMap<u16, &'static str>,
}

impl CurrencyTable {
    /// Build a table from `(code, number)` pairs.
    pub fn from_entries(entries: &[(&'static str, u16)]) -> Self {
        let code_to_number: HashMap<_, _> = entries.iter().copied().collect();
        let number_to_code = code_to_number
            .iter()
            .map(|(code, number)| (*number, *code))
            .collect();

        Self {
            code_to_number,
            number_to_code,
        }
    }

    /// Build the standard ISO 4217 table.
    pub fn iso4217() -> Self {
        Self::from_entries(ISO_4217)
    }

    /// Get the numeric code for an alphabetic code.
    ///
    /// Missing entries are a table maintenance problem and are not pre-validated.
    pub fn number_of(&self, code: &str) -> Result<u16> {
        self.code_to_number
            .get(code)
            .copied()
            .ok_or_else(|| CurrencyError::NotFound(code.to_string()))
    }

    /// Get the alphabetic code for a numeric code.
    pub fn code_of(&self, number: u16) -> Result<&'static str> {
        self.number_to_code
            .get(&number)
            .copied()
            .ok_or_else(|| CurrencyError::NotFound(number.to_string()))
    }

    /// Resolve a code or a numeric string to the canonical alphabetic code.
    pub fn code_of_str(&self, currency: &str) -> Result<&'static str> {
        if let Some((code, _)) = self.code_to_number.get_key_value(currency) {
            return Ok(*code);
        }

        Self::parse_number(currency)
            .and_then(|number| self.number_to_code.get(&number).copied())
            .ok_or_else(|| CurrencyError::InvalidArgument(currency.to_string()))
    }

    /// Check whether the string is a known code or a known numeric code.
    pub fn is_valid(&self, currency: &str) -> bool {
        self.code_of_str(currency).is_ok()
    }

    /// Number of currencies in the table.
    pub fn len(&self) -> usize {
        self.code_to_number.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.code_to_number.is_empty()
    }

    fn parse_number(value: &str) -> Option<u16> {
        value.trim().parse().ok()
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::iso4217()
    }
}
