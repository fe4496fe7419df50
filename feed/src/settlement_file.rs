//! Fixed-width settlement rate file.
//!
//! One header line (`H`), any number of detail lines (`D`) and one trailer
//! line (`T`). Blank lines are ignored and every line is trimmed before
//! its columns are read.
//!
//! ```text
//! H201710211400191
//! D5557772MD000013654316250000013675000000000013675683750
//! T00000100001731625193984
//! ```

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::document::{DetailRecord, FeedHeader, RateFeed, TrailerRecord};
use crate::error::{FeedError, FeedResult};

const HEADER_TAG: char = 'H';
const DETAIL_TAG: char = 'D';
const TRAILER_TAG: char = 'T';

const HEADER_DATETIME: (usize, usize) = (1, 15);
const HEADER_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";
const HEADER_VERSION_POSITION: usize = 15;
const HEADER_VERSION: &str = "1";

const SOURCE_CURRENCY: (usize, usize) = (1, 4);
const REFERENCE_CURRENCY: (usize, usize) = (4, 7);
const SOURCE_EXPONENT: (usize, usize) = (7, 8);
const RATE_CLASS: (usize, usize) = (8, 9);
const RATE_FORMAT: (usize, usize) = (9, 10);
const BUY_RATE: (usize, usize) = (10, 25);
const MID_RATE: (usize, usize) = (25, 40);
const SELL_RATE: (usize, usize) = (40, 55);

/// Digits after the implied decimal point of a 15 digit rate.
const RATE_FRACTION_DIGITS: u32 = 8;
const RATE_WIDTH: usize = 15;

const TRAILER_TOTAL_RECORDS: (usize, usize) = (1, 7);
const TRAILER_HASH_TOTAL: (usize, usize) = (7, 24);

/// Only rates quoted against USD are imported.
pub const ALLOWED_REFERENCE_CURRENCIES: &[u16] = &[840];
/// Only mid-market rate class.
pub const ALLOWED_RATE_CLASSES: &[&str] = &["M"];
/// Only direct rate format.
pub const ALLOWED_RATE_FORMATS: &[&str] = &["D"];
/// CNH, CNY offshore, SVC and ESA are skipped.
pub const EXCLUDED_SOURCE_CURRENCIES: &[u16] = &[157, 158, 222, 996];

/// Header date layout used in the import document.
pub const DOCUMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A detail line with every column decoded, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementDetail {
    pub source_currency_number: u16,
    pub reference_currency_number: u16,
    pub source_currency_exponent: u8,
    pub rate_class: String,
    pub rate_format: String,
    pub buy_rate: Decimal,
    pub mid_rate: Decimal,
    pub sell_rate: Decimal,
}

impl SettlementDetail {
    /// Check whether this line belongs in the import.
    pub fn is_allowed(&self) -> bool {
        ALLOWED_REFERENCE_CURRENCIES.contains(&self.reference_currency_number)
            && ALLOWED_RATE_CLASSES.contains(&self.rate_class.as_str())
            && ALLOWED_RATE_FORMATS.contains(&self.rate_format.as_str())
            && !EXCLUDED_SOURCE_CURRENCIES.contains(&self.source_currency_number)
    }

    fn into_record(self) -> DetailRecord {
        DetailRecord {
            source_currency_number: self.source_currency_number,
            source_currency_exponent: self.source_currency_exponent,
            buy_currency_conversion_rate: self.buy_rate,
            mid_currency_conversion_rate: self.mid_rate,
            sell_currency_conversion_rate: self.sell_rate,
        }
    }
}

/// Read and parse a settlement rate file from disk.
#[instrument]
pub fn read_settlement_file(path: &Path) -> FeedResult<RateFeed> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FeedError::EmptyFile(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if contents.is_empty() {
        return Err(FeedError::EmptyFile(path.to_path_buf()));
    }

    parse_settlement_file(&contents)
}

/// Parse the contents of a settlement rate file into an import document.
///
/// Malformed detail lines are logged and skipped. Structural problems,
/// a malformed header or trailer, or a record count mismatch fail the
/// whole file. The trailer hash total is carried through unchecked.
pub fn parse_settlement_file(contents: &str) -> FeedResult<RateFeed> {
    let lines: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    check_structure(&lines)?;

    let header = parse_header(lines[0])?;
    let (total_records, hash_total) = parse_trailer(lines[lines.len() - 1])?;
    let details = &lines[1..lines.len() - 1];

    if total_records as usize != details.len() {
        return Err(FeedError::RecordCount {
            expected: total_records,
            actual: details.len(),
        });
    }

    let mut detail_records = Vec::with_capacity(details.len());
    for line in details {
        match parse_detail(line) {
            Ok(detail) if detail.is_allowed() => detail_records.push(detail.into_record()),
            Ok(detail) => {
                debug!(
                    source = detail.source_currency_number,
                    reference = detail.reference_currency_number,
                    "Skipping filtered detail record"
                );
            }
            Err(e) => warn!(line = %line, error = %e, "Skipping improper detail record"),
        }
    }

    info!(
        date = %header.date,
        total = details.len(),
        imported = detail_records.len(),
        "Parsed settlement rate file"
    );

    Ok(RateFeed {
        header: Some(header),
        detail_records,
        trailer: Some(TrailerRecord {
            total_records: Some(total_records),
            hash_total: Some(hash_total),
        }),
    })
}

fn check_structure(lines: &[&str]) -> FeedResult<()> {
    let count = |tag: char| lines.iter().filter(|line| line.starts_with(tag)).count();

    if count(HEADER_TAG) != 1 {
        return Err(FeedError::Format("expected exactly one header".to_string()));
    }
    if count(TRAILER_TAG) != 1 {
        return Err(FeedError::Format("expected exactly one trailer".to_string()));
    }
    if !lines.first().is_some_and(|line| line.starts_with(HEADER_TAG)) {
        return Err(FeedError::Format("header is not the first line".to_string()));
    }
    if !lines.last().is_some_and(|line| line.starts_with(TRAILER_TAG)) {
        return Err(FeedError::Format("trailer is not the last line".to_string()));
    }
    if lines[1..lines.len() - 1]
        .iter()
        .any(|line| !line.starts_with(DETAIL_TAG))
    {
        return Err(FeedError::Format("unexpected record type".to_string()));
    }

    Ok(())
}

fn column(line: &str, (start, end): (usize, usize)) -> Option<&str> {
    line.get(start..end)
}

fn parse_header(line: &str) -> FeedResult<FeedHeader> {
    let version = column(line, (HEADER_VERSION_POSITION, HEADER_VERSION_POSITION + 1))
        .ok_or_else(|| FeedError::Header("line too short".to_string()))?;
    if version != HEADER_VERSION {
        return Err(FeedError::Header(format!("unsupported format version {version}")));
    }

    let raw = column(line, HEADER_DATETIME)
        .ok_or_else(|| FeedError::Header("line too short".to_string()))?;
    let date = NaiveDateTime::parse_from_str(raw, HEADER_DATETIME_FORMAT)
        .map_err(|_| FeedError::Header(format!("improper date {raw}")))?;

    Ok(FeedHeader {
        date: date.format(DOCUMENT_DATE_FORMAT).to_string(),
    })
}

fn parse_trailer(line: &str) -> FeedResult<(u32, u64)> {
    let field = |span| {
        column(line, span)
            .filter(|value| value.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| FeedError::Trailer(line.to_string()))
    };

    let total_records = field(TRAILER_TOTAL_RECORDS)?
        .parse()
        .map_err(|_| FeedError::Trailer(line.to_string()))?;
    let hash_total = field(TRAILER_HASH_TOTAL)?
        .parse()
        .map_err(|_| FeedError::Trailer(line.to_string()))?;

    Ok((total_records, hash_total))
}

/// Decode one detail line. Fails on short lines or non-numeric columns.
pub fn parse_detail(line: &str) -> FeedResult<SettlementDetail> {
    let improper = || FeedError::Format(format!("improper detail record: {line}"));
    let text = |span| column(line, span).ok_or_else(improper);
    let number = |span| {
        text(span)
            .ok()
            .filter(|value| value.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|value| u16::from_str(value).ok())
            .ok_or_else(improper)
    };
    let rate = |span| text(span).ok().and_then(parse_rate).ok_or_else(improper);

    let source_currency_exponent =
        u8::try_from(number(SOURCE_EXPONENT)?).map_err(|_| improper())?;

    Ok(SettlementDetail {
        source_currency_number: number(SOURCE_CURRENCY)?,
        reference_currency_number: number(REFERENCE_CURRENCY)?,
        source_currency_exponent,
        rate_class: text(RATE_CLASS)?.to_string(),
        rate_format: text(RATE_FORMAT)?.to_string(),
        buy_rate: rate(BUY_RATE)?,
        mid_rate: rate(MID_RATE)?,
        sell_rate: rate(SELL_RATE)?,
    })
}

/// Decode a 15 digit rate with 8 implied fraction digits.
fn parse_rate(raw: &str) -> Option<Decimal> {
    if raw.len() != RATE_WIDTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mantissa = i64::from_str(raw).ok()?;
    Some(Decimal::new(mantissa, RATE_FRACTION_DIGITS).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "H201710211400191";
    const EUR_DETAIL: &str = "D9788402MD000000008503000000000008510000000000008517000";
    const GBP_DETAIL: &str = "D8268402MD000000007501000000000007510000000000007519000";

    fn file(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_parse_detail_line() {
        let detail =
            parse_detail("D5557772MD000013654316250000013675000000000013675683750999999999999999")
                .unwrap();

        assert_eq!(detail.source_currency_number, 555);
        assert_eq!(detail.reference_currency_number, 777);
        assert_eq!(detail.source_currency_exponent, 2);
        assert_eq!(detail.rate_class, "M");
        assert_eq!(detail.rate_format, "D");
        assert_eq!(detail.buy_rate, dec!(136.5431625));
        assert_eq!(detail.mid_rate, dec!(136.75));
        assert_eq!(detail.sell_rate, dec!(136.7568375));
    }

    #[test]
    fn test_parse_detail_rejects_bad_columns() {
        assert!(parse_detail("test").is_err());
        assert!(parse_detail("Dana8402MD000013674316250000013675000000000013675683750").is_err());
        assert!(parse_detail("D555777pMD000013674316250000013675000000000013675683750").is_err());
        assert!(parse_detail("D5557772MD0000136p4316250000013675000000000013675683750").is_err());
        assert!(parse_detail("D5557772MD00001362431625000001365p000000000013675683750").is_err());
        assert!(parse_detail("D5557772MD000013654316250000013675000000000013656p83750").is_err());
    }

    #[test]
    fn test_detail_filter() {
        let allowed = parse_detail(EUR_DETAIL).unwrap();
        assert!(allowed.is_allowed());

        let wrong_reference = SettlementDetail {
            reference_currency_number: 978,
            ..allowed.clone()
        };
        assert!(!wrong_reference.is_allowed());

        let wrong_class = SettlementDetail {
            rate_class: "F".to_string(),
            ..allowed.clone()
        };
        assert!(!wrong_class.is_allowed());

        let wrong_format = SettlementDetail {
            rate_format: "P".to_string(),
            ..allowed.clone()
        };
        assert!(!wrong_format.is_allowed());

        for excluded in EXCLUDED_SOURCE_CURRENCIES {
            let detail = SettlementDetail {
                source_currency_number: *excluded,
                ..allowed.clone()
            };
            assert!(!detail.is_allowed());
        }
    }

    #[test]
    fn test_parse_header() {
        let header = parse_header(HEADER).unwrap();
        assert_eq!(header.date, "2017-10-21 14:00:19");
    }

    #[test]
    fn test_parse_header_rejects_bad_lines() {
        assert!(matches!(parse_header("H"), Err(FeedError::Header(_))));
        assert!(matches!(parse_header("H201710211400192"), Err(FeedError::Header(_))));
        assert!(matches!(parse_header("H15321a156456411"), Err(FeedError::Header(_))));
    }

    #[test]
    fn test_parse_trailer() {
        assert_eq!(
            parse_trailer("T00022200001731625193984").unwrap(),
            (222, 1731625193984)
        );
        assert!(matches!(parse_trailer("T12"), Err(FeedError::Trailer(_))));
    }

    #[test]
    fn test_parse_file() {
        let contents = file(&[
            HEADER,
            "",
            EUR_DETAIL,
            "D1578402MD000000006500000000000006510000000000006520000",
            GBP_DETAIL,
            "   ",
            "T00000300000000000000000   ",
        ]);

        let feed = parse_settlement_file(&contents).unwrap();

        assert_eq!(feed.header.unwrap().date, "2017-10-21 14:00:19");
        assert_eq!(feed.trailer.unwrap().total_records, Some(3));
        let numbers: Vec<u16> = feed
            .detail_records
            .iter()
            .map(|d| d.source_currency_number)
            .collect();
        assert_eq!(numbers, vec![978, 826]);
        assert_eq!(feed.detail_records[0].buy_currency_conversion_rate, dec!(0.08503));
    }

    #[test]
    fn test_parse_file_skips_improper_detail() {
        let contents = file(&[
            HEADER,
            EUR_DETAIL,
            "D97884",
            "T00000200000000000000000",
        ]);

        let feed = parse_settlement_file(&contents).unwrap();
        assert_eq!(feed.detail_records.len(), 1);
    }

    #[test]
    fn test_parse_file_record_count_mismatch() {
        let contents = file(&[HEADER, EUR_DETAIL, "T00000200000000000000000"]);

        let result = parse_settlement_file(&contents);
        assert!(matches!(
            result,
            Err(FeedError::RecordCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_parse_file_structure() {
        let trailer = "T00000100000000000000000";

        let no_header = file(&[EUR_DETAIL, trailer]);
        assert!(matches!(parse_settlement_file(&no_header), Err(FeedError::Format(_))));

        let two_headers = file(&[HEADER, HEADER, EUR_DETAIL, trailer]);
        assert!(matches!(parse_settlement_file(&two_headers), Err(FeedError::Format(_))));

        let trailer_not_last = file(&[HEADER, trailer, EUR_DETAIL]);
        assert!(matches!(
            parse_settlement_file(&trailer_not_last),
            Err(FeedError::Format(_))
        ));

        let foreign_record = file(&[HEADER, "X123", trailer]);
        assert!(matches!(
            parse_settlement_file(&foreign_record),
            Err(FeedError::Format(_))
        ));

        assert!(matches!(parse_settlement_file(""), Err(FeedError::Format(_))));
    }

    #[test]
    fn test_read_missing_or_empty_file() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.sw0");
        assert!(matches!(read_settlement_file(&missing), Err(FeedError::EmptyFile(_))));

        let empty = dir.path().join("I_171021_T057.sw0");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(read_settlement_file(&empty), Err(FeedError::EmptyFile(_))));
    }

    #[test]
    fn test_read_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("I_171021_T057.sw0");
        std::fs::write(&path, file(&[HEADER, GBP_DETAIL, "T00000100000000000000000"])).unwrap();

        let feed = read_settlement_file(&path).unwrap();
        assert_eq!(feed.detail_records.len(), 1);
        assert_eq!(feed.detail_records[0].source_currency_number, 826);
    }
}
