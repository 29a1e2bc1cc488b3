//! On-disk sunset cache keyed by day of year.
//!
//! The file is a flat JSON object mapping `"1"`..`"366"` to RFC 3339 sunset
//! timestamps:
//!
//! ```json
//! {
//!   "75": "2024-03-15T18:42:00+03:00",
//!   "76": "2024-03-16T18:43:00+03:00"
//! }
//! ```
//!
//! Every entry held in memory is a valid [`SunsetRecord`]. Entries that fail
//! to parse are dropped on load and the pruned file is written back at once;
//! a file that is not a JSON object at all is moved aside to `<file>.corrupt`.
//! Each mutation rewrites the whole file through a temporary file and rename.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::common::utils::private_path;
use crate::error::SunsetError;
use crate::sunset::SunsetRecord;

const MIN_DAY_KEY: u32 = 1;
const MAX_DAY_KEY: u32 = 366;

#[derive(Debug, Clone, PartialEq)]
pub struct SunsetCache {
    path: PathBuf,
    entries: BTreeMap<u32, SunsetRecord>,
}

/// One entry as it appears on disk, valid or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub key: String,
    pub value: String,
    pub record: Option<SunsetRecord>,
}

/// Result of reading the cache file.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Entries dropped because key or value was invalid.
    pub purged: Vec<SunsetError>,
    /// Where an unreadable file was moved.
    pub quarantined: Option<PathBuf>,
}

impl SunsetCache {
    /// Empty cache backed by `path`. Nothing is written until a mutation.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load and validate the cache file. Never fails; problems are logged
    /// and the cache starts (partly) empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self::load_with_report(path).0
    }

    pub fn load_with_report(path: impl Into<PathBuf>) -> (Self, LoadReport) {
        let mut cache = Self::empty(path);
        let mut report = LoadReport::default();

        if !cache.path.exists() {
            log_debug!("No sunset cache at {}", private_path(&cache.path));
            return (cache, report);
        }

        let content = match fs::read_to_string(&cache.path) {
            Ok(content) => content,
            Err(e) => {
                log_warning!(
                    "Failed to read sunset cache {}: {e}",
                    private_path(&cache.path)
                );
                return (cache, report);
            }
        };

        let object = match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(_) | Err(_) => {
                report.quarantined = cache.quarantine();
                return (cache, report);
            }
        };

        for (key, value) in object {
            match parse_entry(&key, &value) {
                Some((day, record)) => {
                    cache.entries.insert(day, record);
                }
                None => {
                    let error = SunsetError::CacheCorruption {
                        key,
                        value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                    };
                    log_warning!("Dropping {error}");
                    report.purged.push(error);
                }
            }
        }

        if !report.purged.is_empty() {
            log_indented!(
                "Removed {} invalid cache entr{}",
                report.purged.len(),
                if report.purged.len() == 1 { "y" } else { "ies" }
            );
            if let Err(e) = cache.persist() {
                log_warning!("{e}");
            }
        }

        log_debug!(
            "Loaded {} cached sunset(s) from {}",
            cache.entries.len(),
            private_path(&cache.path)
        );
        (cache, report)
    }

    /// Read the file without validating or rewriting it.
    ///
    /// `Ok(None)` when there is no file. Entries come back in key order, with
    /// `record` set only for entries [`SunsetCache::load`] would keep.
    pub fn inspect(path: &Path) -> Result<Option<Vec<RawEntry>>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", private_path(path)))?;
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON object", private_path(path)))?;

        let mut entries: Vec<RawEntry> = object
            .into_iter()
            .map(|(key, value)| RawEntry {
                record: parse_entry(&key, &value).map(|(_, record)| record),
                value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                key,
            })
            .collect();
        entries.sort_by_key(|entry| {
            let day = entry.key.trim().parse::<u32>().unwrap_or(u32::MAX);
            (day, entry.key.clone())
        });
        Ok(Some(entries))
    }

    /// Move an unreadable file aside and start from an empty cache on disk.
    fn quarantine(&self) -> Option<PathBuf> {
        let target = with_suffix(&self.path, ".corrupt");
        log_warning!(
            "Sunset cache {} is not a JSON object, moving it to {}",
            private_path(&self.path),
            private_path(&target)
        );

        let moved = match fs::rename(&self.path, &target) {
            Ok(()) => Some(target),
            Err(e) => {
                log_warning!("Failed to move corrupt cache aside: {e}");
                None
            }
        };

        if let Err(e) = self.persist() {
            log_warning!("{e}");
        }
        moved
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached sunset for `date`, only if the entry's own date matches.
    ///
    /// Day-of-year keys repeat every year, so an entry for the same key from
    /// another year is a miss.
    pub fn get(&self, date: NaiveDate) -> Option<SunsetRecord> {
        self.entries
            .get(&date.ordinal())
            .filter(|record| record.date() == date)
            .copied()
    }

    pub fn contains_valid(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    /// Store `record` under its date's key and persist.
    ///
    /// The in-memory entry is kept even when the write fails.
    pub fn insert(&mut self, record: SunsetRecord) -> Result<(), SunsetError> {
        self.entries.insert(record.day_key(), record);
        self.persist()
    }

    /// Iterate entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &SunsetRecord)> {
        self.entries.iter().map(|(day, record)| (*day, record))
    }

    /// Write the whole cache atomically.
    pub fn persist(&self) -> Result<(), SunsetError> {
        self.write_file().map_err(SunsetError::Persistence)
    }

    fn write_file(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", private_path(parent)))?;

        let serialized: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|(day, record)| (day.to_string(), record.to_string()))
            .collect();
        let json = serde_json::to_string_pretty(&serialized)?;

        let mut temp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("creating temporary file in {}", private_path(parent)))?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .with_context(|| format!("replacing {}", private_path(&self.path)))?;
        Ok(())
    }

    /// Back the file up to `<file>.bak.<timestamp>` and empty the cache.
    ///
    /// Returns the backup path, or `None` when there was no file to back up.
    pub fn clear(&mut self, now: DateTime<FixedOffset>) -> Result<Option<PathBuf>> {
        let backup = if self.path.exists() {
            let target = with_suffix(
                &self.path,
                &format!(".bak.{}", now.format("%Y%m%d%H%M%S")),
            );
            fs::copy(&self.path, &target)
                .with_context(|| format!("backing up cache to {}", private_path(&target)))?;
            Some(target)
        } else {
            None
        };

        self.entries.clear();
        self.persist()?;
        Ok(backup)
    }
}

fn parse_entry(key: &str, value: &serde_json::Value) -> Option<(u32, SunsetRecord)> {
    let day: u32 = key.trim().parse().ok()?;
    if !(MIN_DAY_KEY..=MAX_DAY_KEY).contains(&day) {
        return None;
    }
    let record = SunsetRecord::parse(value.as_str()?).ok()?;
    // a key that disagrees with its timestamp would shadow the real day
    (record.day_key() == day).then_some((day, record))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
