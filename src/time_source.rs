//! Time source abstraction for real and manually driven time.
//!
//! Every time-dependent component receives an `Arc<dyn TimeSource>` instead of
//! calling `Local::now()` directly. The real source reports the system's local
//! time; [`ManualTimeSource`] is moved by hand, which lets tests walk the engine
//! across sunset, the rollover hour and midnight without waiting.
//!
//! "Local" throughout the crate means the offset carried by `now()`; the
//! offset of some other instant comes from [`TimeSource::offset_at`], which
//! follows DST changes when a real zone is known.

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time with the local offset attached
    fn now(&self) -> DateTime<FixedOffset>;

    /// The local offset in effect right now
    fn local_offset(&self) -> FixedOffset {
        *self.now().offset()
    }

    /// The local offset at `instant`, which differs from the current one
    /// across a DST change.
    fn offset_at(&self, _instant: DateTime<Utc>) -> FixedOffset {
        self.local_offset()
    }
}

/// Real-time implementation that uses actual system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        Local.offset_from_utc_datetime(&instant.naive_utc())
    }
}

/// Shared handle to the system clock.
pub fn system() -> Arc<dyn TimeSource> {
    Arc::new(SystemTimeSource)
}

/// Time source that only moves when told to.
///
/// `now()` keeps the offset it was started with. With a zone attached,
/// [`TimeSource::offset_at`] answers from that zone's rules instead.
#[derive(Debug)]
pub struct ManualTimeSource {
    current: Mutex<DateTime<FixedOffset>>,
    zone: Option<Tz>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Mutex::new(start),
            zone: None,
        }
    }

    /// Parse an RFC 3339 timestamp as the starting point.
    pub fn at(rfc3339: &str) -> Result<Self, String> {
        parse_datetime(rfc3339).map(Self::new)
    }

    /// Like [`ManualTimeSource::at`], with `zone` as the local zone.
    pub fn in_zone(rfc3339: &str, zone: Tz) -> Result<Self, String> {
        let mut clock = Self::at(rfc3339)?;
        clock.zone = Some(zone);
        Ok(clock)
    }

    pub fn set(&self, time: DateTime<FixedOffset>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = time;
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        if let Ok(mut guard) = self.current.lock() {
            *guard += by;
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.current.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self.zone {
            Some(zone) => zone.offset_from_utc_datetime(&instant.naive_utc()).fix(),
            None => self.local_offset(),
        }
    }
}

/// Parse a datetime string with offset, e.g. "2024-03-15T18:00:00+03:00"
pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DDTHH:MM:SS+HH:MM"))
}
