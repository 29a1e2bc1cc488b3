//! Application constants and default values for sunset-clock.
//!
//! This module contains the configuration defaults, validation limits,
//! and operational constants used throughout the application.

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_ROLLOVER_HOUR: u32 = 20; // local hour after which tomorrow's sunset is shown
pub const DEFAULT_SHOW_SECONDS: bool = false;
pub const DEFAULT_LOCATION_API_URL: &str = "https://ipapi.co";
pub const DEFAULT_SUNSET_API_URL: &str = "https://api.sunrise-sunset.org/json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETRY_COOLDOWN_SECS: u64 = 30; // spacing between failed fetches of one day
pub const DEFAULT_FILE_LOGGING: bool = true;
pub const DEFAULT_LABEL: &str = "Sunset in";
pub const DEFAULT_TOMORROW_LABEL: &str = "Tomorrow's sunset in";

// ═══ Validation Limits ═══

pub const MINIMUM_ROLLOVER_HOUR: u32 = 0;
pub const MAXIMUM_ROLLOVER_HOUR: u32 = 23;

pub const MINIMUM_REQUEST_TIMEOUT_SECS: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const MINIMUM_RETRY_COOLDOWN_SECS: u64 = 0;
pub const MAXIMUM_RETRY_COOLDOWN_SECS: u64 = 3600;

// ═══ Display ═══

/// Shown when no sunset instant can be resolved.
pub const PLACEHOLDER: &str = "--:--";

/// Prefix telling the presentation layer that tomorrow's sunset is shown.
pub const TOMORROW_MARKER: &str = "T ";

// ═══ Files ═══

pub const APP_NAME: &str = "sunset-clock";
pub const CONFIG_FILE_NAME: &str = "sunset-clock.toml";
pub const GEO_FILE_NAME: &str = "geo.toml";
pub const CACHE_FILE_NAME: &str = "sunsets.json";
pub const LOCK_FILE_NAME: &str = "sunset-clock.lock";

// ═══ Operational Timing Constants ═══

pub const TICK_INTERVAL_MS: u64 = 1000;
pub const HEARTBEAT_LOG_INTERVAL_SECS: u32 = 30; // "clock running" line in the log
pub const STOP_WAIT_TIMEOUT_MS: u64 = 3000;

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
