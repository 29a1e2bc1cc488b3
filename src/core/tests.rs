use super::*;
use crate::sunset::SunsetFetcher;
use crate::time_source::ManualTimeSource;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

/// Fetcher answering from a per-date script and recording every call.
#[derive(Clone, Default)]
struct ScriptedFetcher {
    answers: Arc<Mutex<HashMap<NaiveDate, Result<String, String>>>>,
    calls: Arc<Mutex<Vec<NaiveDate>>>,
}

impl ScriptedFetcher {
    fn answer(&self, date: NaiveDate, sunset: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(date, Ok(sunset.to_string()));
    }

    fn fail(&self, date: NaiveDate, message: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(date, Err(message.to_string()));
    }

    fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }
}

impl SunsetFetcher for ScriptedFetcher {
    fn fetch(&self, date: NaiveDate) -> Result<SunsetRecord, SunsetError> {
        self.calls.lock().unwrap().push(date);
        match self.answers.lock().unwrap().get(&date) {
            Some(Ok(sunset)) => Ok(SunsetRecord::parse(sunset).unwrap()),
            Some(Err(message)) => Err(SunsetError::Lookup(anyhow::anyhow!("{message}"))),
            None => Err(SunsetError::Lookup(anyhow::anyhow!("no answer for {date}"))),
        }
    }
}

/// Dispatch that accepts requests and never completes them.
#[derive(Clone, Default)]
struct HeldDispatch {
    submitted: Arc<Mutex<Vec<NaiveDate>>>,
}

impl FetchDispatch for HeldDispatch {
    fn submit(&mut self, date: NaiveDate) {
        self.submitted.lock().unwrap().push(date);
    }

    fn completed(&mut self) -> Vec<FetchOutcome> {
        Vec::new()
    }
}

/// Dispatch whose outcomes are handed in by the test.
#[derive(Clone, Default)]
struct QueuedDispatch {
    ready: Arc<Mutex<Vec<FetchOutcome>>>,
}

impl QueuedDispatch {
    fn deliver(&self, date: NaiveDate, sunset: &str) {
        self.ready.lock().unwrap().push(FetchOutcome {
            date,
            result: Ok(SunsetRecord::parse(sunset).unwrap()),
        });
    }
}

impl FetchDispatch for QueuedDispatch {
    fn submit(&mut self, _date: NaiveDate) {}

    fn completed(&mut self) -> Vec<FetchOutcome> {
        std::mem::take(&mut *self.ready.lock().unwrap())
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn clock_at(s: &str) -> Arc<ManualTimeSource> {
    Arc::new(ManualTimeSource::at(s).unwrap())
}

fn empty_cache() -> (TempDir, SunsetCache) {
    let dir = tempdir().unwrap();
    let cache = SunsetCache::empty(dir.path().join("sunsets.json"));
    (dir, cache)
}

fn inline_engine(
    clock: &Arc<ManualTimeSource>,
    cache: SunsetCache,
    fetcher: &ScriptedFetcher,
) -> SunsetEngine {
    SunsetEngine::new(
        clock.clone(),
        cache,
        Box::new(InlineDispatch::new(fetcher.clone())),
        EngineSettings::default(),
    )
}

#[test]
fn test_only_one_fetch_in_flight_per_date() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, cache) = empty_cache();
    let dispatch = HeldDispatch::default();
    let mut engine = SunsetEngine::new(
        clock.clone(),
        cache,
        Box::new(dispatch.clone()),
        EngineSettings::default(),
    );

    for _ in 0..5 {
        assert_eq!(engine.formatted_remaining_time(), "--:--");
        clock.advance(Duration::seconds(1));
    }
    assert_eq!(*dispatch.submitted.lock().unwrap(), vec![day(15)]);
    assert_eq!(engine.pending_fetches(), 1);

    // manual refresh may enqueue a second one
    engine.force_refresh();
    assert_eq!(dispatch.submitted.lock().unwrap().len(), 2);
}

#[test]
fn test_failed_fetch_waits_for_cooldown() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, cache) = empty_cache();
    let fetcher = ScriptedFetcher::default();
    fetcher.fail(day(15), "status INVALID_REQUEST");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    assert_eq!(engine.formatted_remaining_time(), "--:--");
    assert_eq!(fetcher.calls().len(), 1);
    assert!(engine.last_error().unwrap().contains("INVALID_REQUEST"));

    clock.advance(Duration::seconds(29));
    engine.formatted_remaining_time();
    assert_eq!(fetcher.calls().len(), 1);

    fetcher.answer(day(15), "2024-03-15T18:42:00+03:00");
    clock.advance(Duration::seconds(1));
    assert_eq!(engine.formatted_remaining_time(), "06:41");
    assert_eq!(fetcher.calls().len(), 2);
}

#[test]
fn test_force_refresh_ignores_cooldown_and_cache() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, mut cache) = empty_cache();
    cache
        .insert(SunsetRecord::parse("2024-03-15T18:30:00+03:00").unwrap())
        .unwrap();
    let fetcher = ScriptedFetcher::default();
    fetcher.answer(day(15), "2024-03-15T18:42:00+03:00");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    assert_eq!(engine.formatted_remaining_time(), "06:30");
    assert!(fetcher.calls().is_empty());

    engine.force_refresh();
    assert_eq!(engine.target(), DisplayTarget::Unset);
    assert_eq!(engine.formatted_remaining_time(), "06:42");
    assert_eq!(fetcher.calls(), vec![day(15)]);
    assert_eq!(
        engine.cache().get(day(15)).unwrap().to_string(),
        "2024-03-15T18:42:00+03:00"
    );
}

#[test]
fn test_failed_refresh_falls_back_to_cache() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, mut cache) = empty_cache();
    cache
        .insert(SunsetRecord::parse("2024-03-15T18:30:00+03:00").unwrap())
        .unwrap();
    let fetcher = ScriptedFetcher::default();
    fetcher.fail(day(15), "connection refused");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    engine.force_refresh();
    assert_eq!(engine.formatted_remaining_time(), "06:30");
    assert_eq!(fetcher.calls().len(), 1);
}

#[test]
fn test_hourly_revalidation_fetches_today_and_missing_tomorrow() {
    let clock = clock_at("2024-03-15T12:59:58+03:00");
    let (_dir, mut cache) = empty_cache();
    cache
        .insert(SunsetRecord::parse("2024-03-15T18:42:00+03:00").unwrap())
        .unwrap();
    let fetcher = ScriptedFetcher::default();
    fetcher.answer(day(15), "2024-03-15T18:42:10+03:00");
    fetcher.answer(day(16), "2024-03-16T18:43:00+03:00");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    engine.formatted_remaining_time();
    clock.advance(Duration::seconds(1));
    engine.formatted_remaining_time();
    assert!(fetcher.calls().is_empty());

    clock.advance(Duration::seconds(1));
    assert_eq!(engine.formatted_remaining_time(), "05:42");
    assert_eq!(fetcher.calls(), vec![day(15), day(16)]);
    assert_eq!(
        engine.target(),
        DisplayTarget::TodayPending(SunsetRecord::parse("2024-03-15T18:42:10+03:00").unwrap())
    );

    // same hour, no further fetches; next hour skips the cached tomorrow
    clock.advance(Duration::minutes(30));
    engine.formatted_remaining_time();
    assert_eq!(fetcher.calls().len(), 2);
    clock.advance(Duration::minutes(30));
    engine.formatted_remaining_time();
    assert_eq!(fetcher.calls(), vec![day(15), day(16), day(15)]);
}

#[test]
fn test_stale_outcome_is_cached_without_changing_display() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, mut cache) = empty_cache();
    cache
        .insert(SunsetRecord::parse("2024-03-15T18:42:00+03:00").unwrap())
        .unwrap();
    let dispatch = QueuedDispatch::default();
    let mut engine = SunsetEngine::new(
        clock.clone(),
        cache,
        Box::new(dispatch.clone()),
        EngineSettings::default(),
    );
    assert_eq!(engine.formatted_remaining_time(), "06:42");

    // yesterday's answer arrives late
    dispatch.deliver(day(14), "2024-03-14T18:41:00+03:00");
    dispatch.deliver(day(16), "2024-03-16T18:43:00+03:00");
    assert_eq!(engine.formatted_remaining_time(), "06:42");
    assert!(engine.cache().contains_valid(day(14)));
    assert!(engine.cache().contains_valid(day(16)));
}

#[test]
fn test_record_for_wrong_day_is_rejected() {
    let clock = clock_at("2024-03-15T12:00:00+03:00");
    let (_dir, cache) = empty_cache();
    let fetcher = ScriptedFetcher::default();
    fetcher.answer(day(15), "2024-03-16T18:43:00+03:00");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    assert_eq!(engine.formatted_remaining_time(), "--:--");
    assert_eq!(engine.target(), DisplayTarget::Unset);
    assert!(engine.last_error().unwrap().contains("another day"));
    assert!(engine.cache().is_empty());
}

#[test]
fn test_engine_settings_from_settings() {
    let settings = crate::config::Config {
        rollover_hour: Some(18),
        show_seconds: Some(true),
        retry_cooldown_secs: Some(5),
        ..Default::default()
    }
    .resolve();
    let engine_settings = EngineSettings::from(&settings);
    assert_eq!(engine_settings.rollover_hour, 18);
    assert!(engine_settings.show_seconds);
    assert_eq!(engine_settings.retry_cooldown, Duration::seconds(5));
}

#[test]
fn test_failures_from_past_days_are_forgotten_at_midnight() {
    let clock = clock_at("2024-03-15T23:59:50+03:00");
    let (_dir, cache) = empty_cache();
    let fetcher = ScriptedFetcher::default();
    let mut engine = inline_engine(&clock, cache, &fetcher);

    assert_eq!(engine.formatted_remaining_time(), "--:--");
    assert!(engine.failures.contains_key(&day(15)));

    clock.advance(Duration::seconds(20));
    assert_eq!(engine.formatted_remaining_time(), "--:--");
    assert!(!engine.failures.contains_key(&day(15)));
    assert!(engine.failures.keys().all(|date| *date >= day(16)));
    assert_eq!(fetcher.calls()[0], day(15));
}

#[test]
fn test_failed_tomorrow_keeps_zero_until_cooldown_passes() {
    let clock = clock_at("2024-03-15T20:30:00+03:00");
    let (_dir, cache) = empty_cache();
    let fetcher = ScriptedFetcher::default();
    fetcher.answer(day(15), "2024-03-15T18:42:00+03:00");
    fetcher.fail(day(16), "connection refused");
    let mut engine = inline_engine(&clock, cache, &fetcher);

    assert_eq!(engine.formatted_remaining_time(), "00:00");
    assert!(matches!(engine.target(), DisplayTarget::TodayPassed(_)));
    assert_eq!(fetcher.calls(), vec![day(15), day(16)]);
    assert!(engine.last_error().unwrap().contains("connection refused"));

    clock.advance(Duration::seconds(29));
    assert_eq!(engine.formatted_remaining_time(), "00:00");
    assert_eq!(fetcher.calls().len(), 2);

    fetcher.answer(day(16), "2024-03-16T18:43:00+03:00");
    clock.advance(Duration::seconds(1));
    assert_eq!(engine.formatted_remaining_time(), "T 22:12");
    assert!(engine.target().is_tomorrow());
    assert_eq!(fetcher.calls(), vec![day(15), day(16), day(16)]);
}
