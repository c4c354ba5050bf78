//! Inclusive date ranges for post filtering

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// An inclusive `[start, end]` range of instants.
///
/// Request dates arrive either as RFC 3339 datetimes or bare ISO dates.
/// A bare start date means midnight; a bare end date covers the whole day,
/// so `2024-01-31` includes posts up to `2024-01-31T23:59:59.999999Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_bound(start, false)?;
        let end = parse_bound(end, true)?;
        if end < start {
            return Err(anyhow!("end date {} is before start date {}", end, start));
        }
        Ok(Self { start, end })
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Range start as an RFC 3339 query parameter value.
    pub fn date_from(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Range end as an RFC 3339 query parameter value.
    pub fn date_to(&self) -> String {
        self.end.to_rfc3339()
    }
}

fn parse_bound(value: &str, is_end: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow!("unparseable date {:?}: {}", value, e))?;
    let time = if is_end {
        date.and_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| anyhow!("date {:?} out of range", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_bare_dates() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        // End-of-day, inclusive.
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_parse_rfc3339() {
        let range =
            DateRange::parse("2024-01-01T08:00:00Z", "2024-01-01T17:00:00+00:00").unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 1, 1, 7, 59, 59).unwrap()));
    }

    #[test]
    fn test_boundary_inclusivity() {
        let range = DateRange::parse("2024-01-01T00:00:00Z", "2024-01-31T00:00:00Z").unwrap();
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        // One microsecond outside either bound does not count.
        assert!(!range.contains(range.start - chrono::Duration::microseconds(1)));
        assert!(!range.contains(range.end + chrono::Duration::microseconds(1)));
    }

    #[test]
    fn test_rejects_garbage_and_inverted() {
        assert!(DateRange::parse("yesterday", "2024-01-31").is_err());
        assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
    }
}
