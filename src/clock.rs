//! The foreground countdown clock.
//!
//! [`SunsetClock::run`] owns the process lifecycle:
//! - configuration loading and the single-instance lock
//! - signal handling (SIGUSR1 refresh, SIGINT/SIGTERM/SIGHUP shutdown)
//! - the optional daily log file, moved to a new file at midnight
//! - the fetch worker and the [`SunsetEngine`]
//! - a once-per-second redraw of `"<label> HH:MM"` on the terminal
//!
//! The engine is only ever touched from this thread; network work happens on
//! the worker spawned by [`WorkerDispatch`].

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::common::constants::*;
use crate::common::utils::{TerminalGuard, private_path};
use crate::config::{self, Config, Settings};
use crate::core::{EngineSettings, SunsetEngine, WorkerDispatch};
use crate::io::lock::{self, LockOutcome};
use crate::io::signals::{SignalMessage, SignalState, setup_signal_handler};
use crate::logger::{Log, LoggerGuard};
use crate::state::{self, SunsetCache};
use crate::sunset::RemoteSunsetFetcher;
use crate::time_source::{self, TimeSource};

/// Runs the countdown clock in the foreground.
pub struct SunsetClock {
    debug_enabled: bool,
}

impl SunsetClock {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    /// Run until a shutdown signal arrives.
    pub fn run(self) -> Result<()> {
        log_version!();

        let settings = match Config::load() {
            Ok(config) => config.resolve(),
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{:?}", e);
                std::process::exit(EXIT_FAILURE);
            }
        };

        // held until run returns
        let _lock = match lock::acquire_lock()? {
            LockOutcome::Acquired(lock) => lock,
            LockOutcome::AlreadyRunning(info) => {
                log_error_exit!("sunset-clock is already running (PID: {})", info.pid);
                log_indented!("Use 'sunset-clock refresh' or 'sunset-clock stop'");
                std::process::exit(EXIT_FAILURE);
            }
        };

        let signal_state = setup_signal_handler()?;

        if let Some(custom_dir) = config::get_custom_config_dir() {
            log_block_start!("Base directory: {}", private_path(&custom_dir));
        }
        settings.log_settings();

        let clock = time_source::system();
        let mut daily_log = if settings.file_logging {
            DailyLog::start(clock.as_ref())
        } else {
            None
        };

        let cache = SunsetCache::load(&settings.cache_file);
        let fetcher = RemoteSunsetFetcher::from_settings(&settings, clock.clone())
            .context("Failed to set up sunset lookups")?;
        let dispatch = WorkerDispatch::spawn(fetcher)?;
        let engine = SunsetEngine::new(
            clock.clone(),
            cache,
            Box::new(dispatch),
            EngineSettings::from(&settings),
        );

        log_block_start!("Starting sunset-clock...");
        if self.debug_enabled {
            log_debug!("Redrawing every {TICK_INTERVAL_MS}ms");
        }

        {
            let terminal =
                TerminalGuard::new().context("failed to initialize terminal features")?;
            if !terminal.is_interactive() {
                log_debug!("No interactive terminal, printing one line per tick");
            }
            let mut session = Session {
                settings: &settings,
                signal_state: &signal_state,
                terminal: &terminal,
                clock: clock.as_ref(),
                daily_log: daily_log.as_mut(),
            };
            session.main_loop(engine);
        }

        log_block_start!("Shutting down sunset-clock...");
        log_end!();
        Ok(())
    }
}

/// The log file for the current day.
struct DailyLog {
    guard: LoggerGuard,
    date: NaiveDate,
}

impl DailyLog {
    /// Route the log to today's file in the state directory.
    fn start(clock: &dyn TimeSource) -> Option<Self> {
        let date = clock.now().date_naive();
        let path = match state::log_file_path(date) {
            Ok(path) => path,
            Err(e) => {
                log_warning!("File logging disabled: {e:#}");
                return None;
            }
        };

        log_block_start!("Logging to {}", private_path(&path));
        match Log::start_file_logging(path) {
            Ok(guard) => Some(Self { guard, date }),
            Err(e) => {
                log_warning!("File logging disabled: {e:#}");
                None
            }
        }
    }

    /// Continue in the file for `today` once the date has changed.
    fn follow_date(&mut self, today: NaiveDate) {
        if today == self.date {
            return;
        }
        let previous = self.date;
        // one attempt per day; on failure the old file stays in use
        self.date = today;

        match state::log_file_path(today).and_then(|path| self.guard.switch_to(&path)) {
            Ok(()) => log_block_start!("Log continued from {previous}"),
            Err(e) => log_warning!("Keeping the log file of {previous}: {e:#}"),
        }
    }
}

struct Session<'a> {
    settings: &'a Settings,
    signal_state: &'a SignalState,
    terminal: &'a TerminalGuard,
    clock: &'a dyn TimeSource,
    daily_log: Option<&'a mut DailyLog>,
}

impl Session<'_> {
    fn main_loop(&mut self, mut engine: SunsetEngine) {
        let tick = Duration::from_millis(TICK_INTERVAL_MS);
        let heartbeat = Duration::from_secs(u64::from(HEARTBEAT_LOG_INTERVAL_SECS));
        let mut last_heartbeat: Option<Instant> = None;
        let mut signals_connected = true;

        while self.signal_state.is_running() {
            if let Some(log) = self.daily_log.as_deref_mut() {
                log.follow_date(self.clock.now().date_naive());
            }

            let countdown = engine.formatted_remaining_time();
            let line = status_line(
                &self.settings.label,
                &self.settings.tomorrow_label,
                &countdown,
            );

            if let Err(e) = self.terminal.draw_line(&line) {
                log_warning!("Failed to draw countdown: {e}");
            }
            if last_heartbeat.is_none_or(|at| at.elapsed() >= heartbeat) {
                log_decorated!("Clock running: {line} ({})", engine.target().name());
                last_heartbeat = Some(Instant::now());
            }

            if !signals_connected {
                std::thread::sleep(tick);
                continue;
            }

            match self.signal_state.signal_receiver.recv_timeout(tick) {
                Ok(SignalMessage::Refresh) => engine.force_refresh(),
                Ok(SignalMessage::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    if !self.signal_state.is_running() {
                        break;
                    }
                    log_pipe!();
                    log_error!("Signal handler disconnected unexpectedly");
                    log_indented!("Signals will no longer be processed");
                    signals_connected = false;
                }
            }
        }
    }
}

/// Text drawn on the terminal: the label followed by the countdown.
///
/// The tomorrow marker is replaced by the tomorrow label.
fn status_line(label: &str, tomorrow_label: &str, countdown: &str) -> String {
    match countdown.strip_prefix(TOMORROW_MARKER) {
        Some(rest) => format!("{tomorrow_label} {rest}"),
        None => format!("{label} {countdown}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_picks_label() {
        assert_eq!(status_line("Sunset in", "Tomorrow in", "00:42"), "Sunset in 00:42");
        assert_eq!(status_line("Sunset in", "Tomorrow in", "T 22:10"), "Tomorrow in 22:10");
        assert_eq!(status_line("Sunset in", "Tomorrow in", PLACEHOLDER), "Sunset in --:--");
    }
}
