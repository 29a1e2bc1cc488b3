//! Persistent state for sunset-clock, following XDG Base Directory standards.
//!
//! The sunset cache lives in `XDG_CACHE_HOME` (it can always be rebuilt from
//! the network); daily log files live in `XDG_STATE_HOME`.

pub mod cache;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::common::constants::{APP_NAME, CACHE_FILE_NAME};

pub use cache::{RawEntry, SunsetCache};

/// Directory for log files, created on demand.
pub fn get_state_dir() -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let dir = state_home.join(APP_NAME);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create state directory {}", dir.display()))?;
    Ok(dir)
}

/// Default location of the sunset cache file.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_NAME)
        .join(CACHE_FILE_NAME)
}

/// Daily log file, e.g. `sunset-clock_20240315.log`.
pub fn log_file_path(date: NaiveDate) -> Result<PathBuf> {
    Ok(get_state_dir()?.join(format!("{APP_NAME}_{}.log", date.format("%Y%m%d"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_log_file_path_uses_state_home() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original = std::env::var("XDG_STATE_HOME").ok();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", temp_dir.path());
        }

        let path = log_file_path(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_STATE_HOME", val),
                None => std::env::remove_var("XDG_STATE_HOME"),
            }
        }

        let path = path.unwrap();
        assert_eq!(
            path,
            temp_dir
                .path()
                .join(APP_NAME)
                .join("sunset-clock_20240315.log")
        );
        assert!(temp_dir.path().join(APP_NAME).is_dir());
    }

    #[test]
    fn test_default_cache_path_file_name() {
        let path = default_cache_path();
        assert!(path.ends_with(format!("{APP_NAME}/{CACHE_FILE_NAME}")));
    }
}
