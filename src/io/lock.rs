//! Lock file management for single-instance enforcement.
//!
//! The lock lives in `$XDG_RUNTIME_DIR` (or `/tmp`) and holds the owner's PID
//! and, when `--config` was used, its configuration directory. A lock left
//! behind by a dead process is cleaned up automatically.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::instance::InstanceInfo;
use crate::common::constants::LOCK_FILE_NAME;
use crate::common::utils::{self, private_path};
use crate::config;

/// An acquired lock. Dropping it releases the lock and removes the file.
#[derive(Debug)]
pub struct LockFile {
    file: File,
    path: PathBuf,
}

impl LockFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Result of trying to become the running instance.
#[derive(Debug)]
pub enum LockOutcome {
    Acquired(LockFile),
    AlreadyRunning(InstanceInfo),
}

/// Path of the main lock file.
pub fn get_main_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Acquire the main lock for this process.
pub fn acquire_lock() -> Result<LockOutcome> {
    acquire_lock_at(&get_main_lock_path())
}

/// Acquire an exclusive lock at `lock_path`.
///
/// A conflicting lock whose owner is gone (or whose contents are unreadable)
/// is treated as stale: the file is removed and locking is retried once.
pub fn acquire_lock_at(lock_path: &Path) -> Result<LockOutcome> {
    if let Some(lock) = try_lock(lock_path)? {
        return Ok(LockOutcome::Acquired(lock));
    }

    match std::fs::read_to_string(lock_path)
        .ok()
        .and_then(|content| InstanceInfo::from_lock_contents(&content).ok())
    {
        Some(info) if utils::is_process_running(info.pid) => {
            return Ok(LockOutcome::AlreadyRunning(info));
        }
        Some(info) => {
            log_warning!(
                "Removing stale lock file (process {} no longer running)",
                info.pid
            );
        }
        None => log_warning!("Lock file format invalid, removing"),
    }
    let _ = std::fs::remove_file(lock_path);

    match try_lock(lock_path)? {
        Some(lock) => Ok(LockOutcome::Acquired(lock)),
        None => anyhow::bail!(
            "Failed to acquire lock {} after cleanup attempt",
            private_path(lock_path)
        ),
    }
}

fn try_lock(lock_path: &Path) -> Result<Option<LockFile>> {
    // no truncation: the current owner's contents must survive a failed attempt
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("Failed to open lock file {}", private_path(lock_path)))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    let info = InstanceInfo {
        pid: std::process::id(),
        config_dir: config::get_custom_config_dir(),
    };
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(info.to_lock_contents().as_bytes())?;
    file.flush()?;

    Ok(Some(LockFile {
        file,
        path: lock_path.to_path_buf(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_lock_reports_running_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let LockOutcome::Acquired(first) = acquire_lock_at(&path).unwrap() else {
            panic!("first lock should be acquired");
        };
        let content = std::fs::read_to_string(first.path()).unwrap();
        assert!(content.starts_with(&std::process::id().to_string()));

        match acquire_lock_at(&path).unwrap() {
            LockOutcome::AlreadyRunning(info) => assert_eq!(info.pid, std::process::id()),
            LockOutcome::Acquired(_) => panic!("lock acquired twice"),
        }

        drop(first);
        assert!(!path.exists());
    }

    #[test]
    fn test_unlocked_leftover_file_is_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        std::fs::write(&path, "garbage\n").unwrap();

        assert!(matches!(
            acquire_lock_at(&path).unwrap(),
            LockOutcome::Acquired(_)
        ));
    }
}
