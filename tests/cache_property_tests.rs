use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike};
use proptest::prelude::*;
use sunset_clock::state::SunsetCache;
use sunset_clock::sunset::SunsetRecord;
use tempfile::tempdir;

/// Offsets from -12:00 to +14:00 in quarter hours
fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
    (-48i32..=56).prop_map(|quarters| FixedOffset::east_opt(quarters * 15 * 60).unwrap())
}

/// Arbitrary instants in 2023-2025 with sub-second noise
fn instant_strategy() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        2023i32..=2025,
        1u32..=365,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1_000_000_000,
        offset_strategy(),
    )
        .prop_map(|(year, ordinal, hour, minute, second, nanos, offset)| {
            let naive = NaiveDate::from_yo_opt(year, ordinal)
                .unwrap()
                .and_hms_nano_opt(hour, minute, second, nanos)
                .unwrap();
            offset.from_local_datetime(&naive).unwrap()
        })
}

proptest! {
    /// Whatever is persisted comes back identical, at whole-second precision
    #[test]
    fn test_persist_then_reload_round_trip(
        instants in prop::collection::vec(instant_strategy(), 1..12)
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sunsets.json");

        let mut cache = SunsetCache::load(&path);
        for instant in &instants {
            cache.insert(SunsetRecord::new(*instant)).unwrap();
        }

        let reloaded = SunsetCache::load(&path);
        prop_assert_eq!(&reloaded, &cache);

        for (_, record) in reloaded.entries() {
            prop_assert_eq!(record.instant().nanosecond(), 0);
            prop_assert_eq!(reloaded.get(record.date()), Some(*record));
        }
    }

    /// The newest record for a day wins and is found under that day only
    #[test]
    fn test_last_insert_for_a_day_wins(instant in instant_strategy(), shift in 1i64..3600) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sunsets.json");

        let first = SunsetRecord::new(instant);
        let second = SunsetRecord::new(instant + chrono::Duration::seconds(shift));
        prop_assume!(first.date() == second.date());

        let mut cache = SunsetCache::load(&path);
        cache.insert(first).unwrap();
        cache.insert(second).unwrap();

        let reloaded = SunsetCache::load(&path);
        prop_assert_eq!(reloaded.len(), 1);
        prop_assert_eq!(reloaded.get(second.date()), Some(second));
        prop_assert_eq!(reloaded.get(second.date().succ_opt().unwrap()), None);
    }
}
