//! The sunset the display is currently counting towards.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use std::fmt;

use crate::sunset::SunsetRecord;

/// Display state of the engine.
///
/// ```text
/// Unset ──hit/fetch──▶ TodayPending ──sunset──▶ TodayPassed ──rollover──▶ TomorrowShown
///   ▲                                                                         │
///   └──────────────── date no longer matches / manual refresh ────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    /// No instant resolved for today yet.
    Unset,
    /// Today's sunset is still ahead.
    TodayPending(SunsetRecord),
    /// Today's sunset is behind us; tomorrow not shown yet.
    TodayPassed(SunsetRecord),
    /// Counting down to tomorrow's sunset.
    TomorrowShown(SunsetRecord),
}

impl DisplayTarget {
    /// Today state for `record` as seen at `now`.
    pub fn for_today(record: SunsetRecord, now: DateTime<FixedOffset>) -> Self {
        if now >= record.instant() {
            Self::TodayPassed(record)
        } else {
            Self::TodayPending(record)
        }
    }

    pub fn record(&self) -> Option<SunsetRecord> {
        match self {
            Self::Unset => None,
            Self::TodayPending(r) | Self::TodayPassed(r) | Self::TomorrowShown(r) => Some(*r),
        }
    }

    /// Whether the held record still belongs to the day this state expects.
    pub fn matches_calendar(&self, today: NaiveDate) -> bool {
        match self {
            Self::Unset => true,
            Self::TodayPending(r) | Self::TodayPassed(r) => r.date() == today,
            Self::TomorrowShown(r) => today.succ_opt() == Some(r.date()),
        }
    }

    /// Time left until the shown sunset, never negative.
    pub fn remaining(&self, now: DateTime<FixedOffset>) -> Option<Duration> {
        match self {
            Self::Unset => None,
            Self::TodayPassed(_) => Some(Duration::zero()),
            Self::TodayPending(r) | Self::TomorrowShown(r) => {
                Some((r.instant() - now).max(Duration::zero()))
            }
        }
    }

    pub fn is_tomorrow(&self) -> bool {
        matches!(self, Self::TomorrowShown(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unset => "Unset",
            Self::TodayPending(_) => "TodayPending",
            Self::TodayPassed(_) => "TodayPassed",
            Self::TomorrowShown(_) => "TomorrowShown",
        }
    }
}

impl fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record() {
            Some(record) => write!(f, "{} ({record})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
