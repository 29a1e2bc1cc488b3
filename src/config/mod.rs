//! Configuration system for sunset-clock.
//!
//! The configuration lives in `sunset-clock.toml` under
//! `$XDG_CONFIG_HOME/sunset-clock/` (or the directory passed with `--config`).
//! Every field is optional; [`Config::resolve`] merges the file with the
//! defaults from [`crate::common::constants`] into a fully populated
//! [`Settings`] value that the rest of the application consumes.
//!
//! ```toml
//! #[Countdown]
//! rollover_hour = 20          # Local hour after which tomorrow's sunset is shown (0-23)
//! show_seconds = false        # Render HH:MM:SS instead of HH:MM
//! label = "Sunset in"
//! tomorrow_label = "Tomorrow's sunset in"
//!
//! #[Location override]
//! latitude = 41.0082          # Skip IP geolocation when both are set
//! longitude = 28.9784
//! timezone = "Europe/Istanbul"
//!
//! #[Network]
//! location_api_url = "https://ipapi.co"
//! sunset_api_url = "https://api.sunrise-sunset.org/json"
//! request_timeout_secs = 10   # (1-120)
//! retry_cooldown_secs = 30    # Wait before retrying a failed day (0-3600)
//!
//! #[Storage]
//! cache_file = "~/.cache/sunset-clock/sunsets.json"
//! file_logging = true
//! ```
//!
//! Coordinates may also live in a separate `geo.toml` next to the main file,
//! which keeps location data out of a version-controlled configuration.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::Result;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;

use crate::common::constants::*;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Geographic configuration stored separately in `geo.toml`.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) timezone: Option<String>,
}

/// Raw configuration as read from `sunset-clock.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub rollover_hour: Option<u32>,
    pub show_seconds: Option<bool>,
    pub label: Option<String>,
    pub tomorrow_label: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>, // IANA id, only used together with coordinates

    pub location_api_url: Option<String>,
    pub sunset_api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub retry_cooldown_secs: Option<u64>,

    pub cache_file: Option<PathBuf>,
    pub file_logging: Option<bool>,
}

/// Fixed coordinates configured by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOverride {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<Tz>,
}

/// Fully resolved settings with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rollover_hour: u32,
    pub show_seconds: bool,
    pub label: String,
    pub tomorrow_label: String,
    pub location: Option<LocationOverride>,
    pub location_api_url: String,
    pub sunset_api_url: String,
    pub request_timeout_secs: u64,
    pub retry_cooldown_secs: u64,
    pub cache_file: PathBuf,
    pub file_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().resolve()
    }
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    /// Get configuration path using the module's get_config_path function
    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    /// Merge this configuration with the built-in defaults.
    ///
    /// Assumes the configuration passed validation; a timezone that does not
    /// parse is dropped rather than reported here.
    pub fn resolve(&self) -> Settings {
        let location = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(LocationOverride {
                latitude,
                longitude,
                timezone: self
                    .timezone
                    .as_deref()
                    .filter(|tz| !tz.is_empty())
                    .and_then(|tz| tz.parse::<Tz>().ok()),
            }),
            _ => None,
        };

        Settings {
            rollover_hour: self.rollover_hour.unwrap_or(DEFAULT_ROLLOVER_HOUR),
            show_seconds: self.show_seconds.unwrap_or(DEFAULT_SHOW_SECONDS),
            label: self
                .label
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            tomorrow_label: self
                .tomorrow_label
                .clone()
                .unwrap_or_else(|| DEFAULT_TOMORROW_LABEL.to_string()),
            location,
            location_api_url: self
                .location_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCATION_API_URL.to_string()),
            sunset_api_url: self
                .sunset_api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SUNSET_API_URL.to_string()),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_cooldown_secs: self
                .retry_cooldown_secs
                .unwrap_or(DEFAULT_RETRY_COOLDOWN_SECS),
            cache_file: self
                .cache_file
                .clone()
                .unwrap_or_else(crate::state::default_cache_path),
            file_logging: self.file_logging.unwrap_or(DEFAULT_FILE_LOGGING),
        }
    }
}

impl Settings {
    pub fn log_settings(&self) {
        log_block_start!("Loaded configuration");
        match &self.location {
            Some(loc) => {
                let lat_dir = if loc.latitude >= 0.0 { "N" } else { "S" };
                let lon_dir = if loc.longitude >= 0.0 { "E" } else { "W" };
                log_indented!(
                    "Location: {:.3}°{}, {:.3}°{} (fixed)",
                    loc.latitude.abs(),
                    lat_dir,
                    loc.longitude.abs(),
                    lon_dir
                );
                if let Some(tz) = loc.timezone {
                    log_indented!("Timezone: {}", tz);
                }
            }
            None => log_indented!("Location: IP geolocation via {}", self.location_api_url),
        }
        log_indented!("Sunset source: {}", self.sunset_api_url);
        log_indented!("Tomorrow shown after: {:02}:00", self.rollover_hour);
        log_indented!(
            "Display: {}",
            if self.show_seconds { "HH:MM:SS" } else { "HH:MM" }
        );
        log_indented!(
            "Cache: {}",
            crate::common::utils::private_path(&self.cache_file)
        );
    }
}

#[cfg(test)]
mod tests;
