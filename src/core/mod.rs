//! Sunset resolution and rollover engine.
//!
//! [`SunsetEngine`] answers one question once per second: what is the
//! countdown to the sunset that should be shown right now? It owns the
//! [`DisplayTarget`] state machine, the on-disk [`SunsetCache`] and the
//! bookkeeping around fetches (one in flight per date, a cooldown after
//! failures, hourly revalidation).
//!
//! All time comes from the injected [`TimeSource`]; "today", "tomorrow" and
//! the rollover hour are evaluated in the offset that source reports.
//!
//! Nothing in here is fatal. Failed lookups are logged and the display falls
//! back to the cached value or the placeholder.

pub mod countdown;
pub mod dispatch;
pub mod target;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::common::constants::MAXIMUM_RETRY_COOLDOWN_SECS;
use crate::config::Settings;
use crate::error::SunsetError;
use crate::state::SunsetCache;
use crate::sunset::SunsetRecord;
use crate::time_source::TimeSource;

pub use dispatch::{FetchDispatch, FetchOutcome, InlineDispatch, WorkerDispatch};
pub use target::DisplayTarget;

/// Upper bound on advance/drain rounds within one tick.
const MAX_SETTLE_PASSES: usize = 4;

/// Engine tunables taken from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub rollover_hour: u32,
    pub show_seconds: bool,
    pub retry_cooldown: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for EngineSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            rollover_hour: settings.rollover_hour,
            show_seconds: settings.show_seconds,
            retry_cooldown: Duration::seconds(
                settings.retry_cooldown_secs.min(MAXIMUM_RETRY_COOLDOWN_SECS) as i64,
            ),
        }
    }
}

pub struct SunsetEngine {
    clock: Arc<dyn TimeSource>,
    cache: SunsetCache,
    dispatch: Box<dyn FetchDispatch>,
    settings: EngineSettings,
    target: DisplayTarget,
    in_flight: HashSet<NaiveDate>,
    failures: HashMap<NaiveDate, DateTime<FixedOffset>>,
    bypass_cache: bool,
    hour_bucket: (NaiveDate, u32),
    last_error: Option<String>,
}

impl SunsetEngine {
    pub fn new(
        clock: Arc<dyn TimeSource>,
        cache: SunsetCache,
        dispatch: Box<dyn FetchDispatch>,
        settings: EngineSettings,
    ) -> Self {
        let now = clock.now();
        Self {
            clock,
            cache,
            dispatch,
            settings,
            target: DisplayTarget::Unset,
            in_flight: HashSet::new(),
            failures: HashMap::new(),
            bypass_cache: false,
            // startup resolution already covers the current hour
            hour_bucket: (now.date_naive(), now.hour()),
            last_error: None,
        }
    }

    /// Countdown text for the current moment: `HH:MM`, `T HH:MM` for
    /// tomorrow, or the placeholder when nothing could be resolved.
    pub fn formatted_remaining_time(&mut self) -> String {
        let now = self.clock.now();
        self.tick(now);
        countdown::render(
            &self.target,
            self.target.remaining(now),
            self.settings.show_seconds,
        )
    }

    /// Drop the current instant and fetch today's sunset again, ignoring the
    /// cache, the in-flight check and any failure cooldown.
    pub fn force_refresh(&mut self) {
        let now = self.clock.now();
        let today = now.date_naive();

        log_block_start!("Manual refresh requested");
        self.set_target(DisplayTarget::Unset);
        self.bypass_cache = true;
        self.failures.remove(&today);
        self.request(today, now, true);
    }

    pub fn target(&self) -> DisplayTarget {
        self.target
    }

    pub fn cache(&self) -> &SunsetCache {
        &self.cache
    }

    /// Message of the most recent failed fetch, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    fn tick(&mut self, now: DateTime<FixedOffset>) {
        self.apply_completed(now);
        self.revalidate_hourly(now);

        for _ in 0..MAX_SETTLE_PASSES {
            self.advance(now);
            if !self.apply_completed(now) {
                break;
            }
        }
    }

    /// Walk the state machine as far as the clock and cache allow.
    fn advance(&mut self, now: DateTime<FixedOffset>) {
        let today = now.date_naive();
        let tomorrow = today.succ_opt();

        if !self.target.matches_calendar(today) {
            log_debug!("{} no longer matches {today}, re-resolving", self.target);
            self.set_target(DisplayTarget::Unset);
        }

        for _ in 0..MAX_SETTLE_PASSES {
            let current = self.target;
            let next = match current {
                DisplayTarget::Unset => {
                    let cached = (!self.bypass_cache)
                        .then(|| self.cache.get(today))
                        .flatten();
                    match cached {
                        Some(record) => Some(DisplayTarget::for_today(record, now)),
                        None => {
                            self.request(today, now, false);
                            None
                        }
                    }
                }
                DisplayTarget::TodayPending(record) if now >= record.instant() => {
                    Some(DisplayTarget::TodayPassed(record))
                }
                DisplayTarget::TodayPassed(_) if now.hour() >= self.settings.rollover_hour => {
                    match tomorrow.and_then(|date| self.cache.get(date)) {
                        Some(record) => Some(DisplayTarget::TomorrowShown(record)),
                        None => {
                            if let Some(date) = tomorrow {
                                self.request(date, now, false);
                            }
                            None
                        }
                    }
                }
                _ => None,
            };

            match next {
                Some(next) => self.set_target(next),
                None => break,
            }
        }
    }

    /// Apply finished fetches. Returns whether there were any.
    fn apply_completed(&mut self, now: DateTime<FixedOffset>) -> bool {
        let outcomes = self.dispatch.completed();
        let any = !outcomes.is_empty();
        for outcome in outcomes {
            self.apply(outcome, now);
        }
        any
    }

    fn apply(&mut self, outcome: FetchOutcome, now: DateTime<FixedOffset>) {
        let FetchOutcome { date, result } = outcome;
        let today = now.date_naive();
        let tomorrow = today.succ_opt();

        self.in_flight.remove(&date);
        if date == today {
            self.bypass_cache = false;
        }

        let record = match result {
            Ok(record) if record.date() == date => record,
            Ok(record) => {
                let error = SunsetError::Lookup(anyhow::anyhow!(
                    "sunset for {date} resolved to {record}, which falls on another day"
                ));
                self.record_failure(date, error, now);
                return;
            }
            Err(error) => {
                self.record_failure(date, error, now);
                return;
            }
        };

        self.failures.remove(&date);
        log_decorated!("Sunset for {date}: {}", record.instant().format("%H:%M:%S %:z"));
        if let Err(e) = self.cache.insert(record) {
            log_warning!("{e}");
        }

        let showing_today = matches!(
            self.target,
            DisplayTarget::Unset | DisplayTarget::TodayPending(_) | DisplayTarget::TodayPassed(_)
        );
        let wants_tomorrow = self.target.is_tomorrow()
            || (matches!(self.target, DisplayTarget::TodayPassed(_))
                && now.hour() >= self.settings.rollover_hour);

        if date == today && showing_today {
            let next = DisplayTarget::for_today(record, now);
            self.set_target(next);

            if matches!(next, DisplayTarget::TodayPassed(_))
                && let Some(date) = tomorrow
                && !self.cache.contains_valid(date)
            {
                log_indented!("Today's sunset has passed, prefetching tomorrow");
                self.request(date, now, false);
            }
        } else if Some(date) == tomorrow && wants_tomorrow {
            self.set_target(DisplayTarget::TomorrowShown(record));
        } else {
            log_debug!("Cached sunset for {date} without changing the display");
        }
    }

    fn record_failure(&mut self, date: NaiveDate, error: SunsetError, now: DateTime<FixedOffset>) {
        log_error!("{} for {date}: {error}", error.kind());
        if self.settings.retry_cooldown > Duration::zero() {
            log_indented!(
                "Next attempt in {}s, showing {}",
                self.settings.retry_cooldown.num_seconds(),
                self.target
            );
        }
        self.failures.insert(date, now);
        self.last_error = Some(error.to_string());
    }

    /// Re-resolve today (and tomorrow if missing) whenever the hour changes.
    fn revalidate_hourly(&mut self, now: DateTime<FixedOffset>) {
        let bucket = (now.date_naive(), now.hour());
        if bucket == self.hour_bucket {
            return;
        }
        let new_day = bucket.0 != self.hour_bucket.0;
        self.hour_bucket = bucket;

        let (today, hour) = bucket;
        if new_day {
            // past days are never requested again
            self.failures.retain(|date, _| *date >= today);
        }
        log_block_start!("Hourly sunset revalidation ({hour:02}:00)");
        self.request(today, now, false);
        if let Some(tomorrow) = today.succ_opt()
            && !self.cache.contains_valid(tomorrow)
        {
            self.request(tomorrow, now, false);
        }
    }

    fn request(&mut self, date: NaiveDate, now: DateTime<FixedOffset>, forced: bool) {
        if !forced {
            if self.in_flight.contains(&date) {
                return;
            }
            if let Some(failed_at) = self.failures.get(&date)
                && now - *failed_at < self.settings.retry_cooldown
            {
                return;
            }
        }

        log_debug!("Requesting sunset for {date}{}", if forced { " (forced)" } else { "" });
        self.in_flight.insert(date);
        self.dispatch.submit(date);
    }

    fn set_target(&mut self, next: DisplayTarget) {
        if next == self.target {
            return;
        }
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.target) {
            match next {
                DisplayTarget::Unset => log_debug!("Display target cleared"),
                DisplayTarget::TodayPending(r) => {
                    log_decorated!("Counting down to today's sunset at {}", hhmm(r))
                }
                DisplayTarget::TodayPassed(r) => {
                    log_decorated!("Today's sunset at {} has passed", hhmm(r))
                }
                DisplayTarget::TomorrowShown(r) => {
                    log_decorated!("Counting down to tomorrow's sunset at {}", hhmm(r))
                }
            }
        }
        self.target = next;
    }
}

fn hhmm(record: SunsetRecord) -> String {
    record.instant().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests;
