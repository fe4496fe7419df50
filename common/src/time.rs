//! Time utilities for rate snapshots.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A timestamp with timezone (always UTC for rate snapshots).
pub type Timestamp = DateTime<Utc>;

/// Naive layouts accepted for feed header dates, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y%m%d%H%M%S",
];

/// Parse the effective date of a feed header.
///
/// Dates carrying an offset are converted to UTC. Naive dates are taken
/// as already being UTC. A bare `YYYY-MM-DD` means midnight.
pub fn parse_effective_date(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_space_separated() {
        let parsed = parse_effective_date("2017-10-21 14:00:19").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2017, 10, 21, 14, 0, 19).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_effective_date("2017-10-21T16:00:19+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2017, 10, 21, 14, 0, 19).unwrap());
    }

    #[test]
    fn test_parse_compact_and_date_only() {
        assert_eq!(
            parse_effective_date("20171021140019"),
            Some(Utc.with_ymd_and_hms(2017, 10, 21, 14, 0, 19).unwrap())
        );
        assert_eq!(
            parse_effective_date("2017-10-21"),
            Some(Utc.with_ymd_and_hms(2017, 10, 21, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_effective_date("").is_none());
        assert!(parse_effective_date("yesterday").is_none());
        assert!(parse_effective_date("2017-13-40 99:00:00").is_none());
    }
}
