//! High-level instance management.
//!
//! Lets one-shot commands (`refresh`, `stop`, `status`) find the running clock
//! through its lock file and talk to it with signals.

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::common::utils;
use crate::io::lock;

/// Information about a running sunset-clock instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    pub pid: u32,
    /// Custom config directory if set
    pub config_dir: Option<PathBuf>,
}

impl InstanceInfo {
    /// Parse instance info from lock file contents.
    ///
    /// Lock file format:
    /// - Line 1: PID
    /// - Line 2: Config directory (optional, empty if default)
    pub fn from_lock_contents(contents: &str) -> Result<Self> {
        let mut lines = contents.lines();

        let pid = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .context("Lock file is empty")?
            .trim()
            .parse::<u32>()
            .context("Invalid PID format in lock file")?;

        let config_dir = lines
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from);

        if lines.any(|line| !line.trim().is_empty()) {
            anyhow::bail!("Invalid lock file format (expected 1-2 lines)");
        }

        Ok(InstanceInfo { pid, config_dir })
    }

    pub fn to_lock_contents(&self) -> String {
        match &self.config_dir {
            Some(dir) => format!("{}\n{}\n", self.pid, dir.display()),
            None => format!("{}\n\n", self.pid),
        }
    }
}

/// Get information about the currently running instance, if any.
///
/// Adopts the instance's config directory so follow-up commands read the
/// same configuration.
pub fn get_running_instance() -> Result<Option<InstanceInfo>> {
    let lock_path = lock::get_main_lock_path();

    let Ok(content) = std::fs::read_to_string(&lock_path) else {
        return Ok(None);
    };
    let info = InstanceInfo::from_lock_contents(&content)?;

    if let Some(ref config_dir) = info.config_dir {
        // already set when --config was given explicitly
        let _ = crate::config::set_config_dir(Some(config_dir.display().to_string()));
    }

    if utils::is_process_running(info.pid) {
        Ok(Some(info))
    } else {
        Ok(None)
    }
}

/// Ask a running instance to re-resolve today's sunset (SIGUSR1).
pub fn send_refresh_signal(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGUSR1)
        .map_err(|e| anyhow::anyhow!("Failed to send refresh signal: {}", e))
}

/// Terminate an instance by sending SIGTERM.
pub fn terminate_instance(pid: u32) -> Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|e| anyhow::anyhow!("Failed to send SIGTERM to process: {}", e))
}

/// Poll until `pid` has exited or `timeout` passed. Returns whether it exited.
pub fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while utils::is_process_running(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_contents_roundtrip() {
        let info = InstanceInfo {
            pid: 4242,
            config_dir: Some(PathBuf::from("/home/user/.config/alt")),
        };
        let parsed = InstanceInfo::from_lock_contents(&info.to_lock_contents()).unwrap();
        assert_eq!(parsed, info);

        let default_dir = InstanceInfo {
            pid: 7,
            config_dir: None,
        };
        assert_eq!(default_dir.to_lock_contents(), "7\n\n");
        assert_eq!(
            InstanceInfo::from_lock_contents("7\n\n").unwrap(),
            default_dir
        );
    }

    #[test]
    fn test_lock_contents_rejects_garbage() {
        assert!(InstanceInfo::from_lock_contents("").is_err());
        assert!(InstanceInfo::from_lock_contents("abc\n").is_err());
        assert!(InstanceInfo::from_lock_contents("1\n/a\n/b\n").is_err());
    }

    #[test]
    fn test_wait_for_exit_times_out_for_live_process() {
        #[cfg(target_os = "linux")]
        assert!(!wait_for_exit(
            std::process::id(),
            Duration::from_millis(60)
        ));
    }
}
