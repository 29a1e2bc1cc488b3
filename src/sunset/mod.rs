//! Sunset instants and their remote resolution.
//!
//! - [`SunsetRecord`]: one resolved sunset, an absolute instant with offset
//! - [`api`]: the remote sunset service and its wire types
//! - [`resolver`]: status checking and timezone normalization of responses
//! - [`fetcher`]: location lookup plus resolution for one calendar day

pub mod api;
pub mod fetcher;
pub mod resolver;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, Timelike};
use std::fmt;
use std::str::FromStr;

pub use api::{HttpSunsetApi, SunsetApi, SunsetQuery, SunsetResponse};
pub use fetcher::{RemoteSunsetFetcher, SunsetFetcher};
pub use resolver::SunsetResolver;

/// A resolved sunset instant, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SunsetRecord(DateTime<FixedOffset>);

impl SunsetRecord {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self(instant.with_nanosecond(0).unwrap_or(instant))
    }

    /// Parse an RFC 3339 timestamp. Strings without an offset are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let instant = DateTime::parse_from_rfc3339(s.trim())
            .with_context(|| format!("{s:?} is not a timestamp with offset"))?;
        Ok(Self::new(instant))
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// Calendar date in the record's own offset.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Day-of-year cache key of the record's date.
    pub fn day_key(&self) -> u32 {
        self.0.ordinal()
    }
}

impl fmt::Display for SunsetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, false))
    }
}

impl FromStr for SunsetRecord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Date sent to the sunset service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDate {
    /// The service's notion of today.
    Today,
    On(NaiveDate),
}

impl RequestDate {
    pub fn as_param(&self) -> String {
        match self {
            RequestDate::Today => "today".to_string(),
            RequestDate::On(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for RequestDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parse_and_display() {
        let record = SunsetRecord::parse("2024-03-15T18:42:00+03:00").unwrap();
        assert_eq!(record.to_string(), "2024-03-15T18:42:00+03:00");
        assert_eq!(record.day_key(), 75);
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let utc = SunsetRecord::parse("2024-03-15T15:42:00Z").unwrap();
        assert_eq!(utc.to_string(), "2024-03-15T15:42:00+00:00");
        assert_eq!(utc, record);
    }

    #[test]
    fn test_record_truncates_to_seconds() {
        let record = SunsetRecord::parse("2024-03-15T18:42:07.987654+03:00").unwrap();
        assert_eq!(record.to_string(), "2024-03-15T18:42:07+03:00");
    }

    #[test]
    fn test_record_rejects_naive_and_garbage() {
        assert!(SunsetRecord::parse("2024-03-15T18:42:00").is_err());
        assert!(SunsetRecord::parse("2024-03-15 18:42").is_err());
        assert!(SunsetRecord::parse("not-a-date").is_err());
        assert!("".parse::<SunsetRecord>().is_err());
    }

    #[test]
    fn test_request_date_param() {
        assert_eq!(RequestDate::Today.as_param(), "today");
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(RequestDate::On(date).as_param(), "2024-12-31");
    }
}
