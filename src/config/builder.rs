//! Default configuration file creation.
//!
//! The generated file lists every setting with its default and valid range so
//! a user can edit it without consulting documentation. Optional settings
//! without a default (fixed coordinates, cache location) are written
//! commented out.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Create a default config file at `path`, including parent directories.
pub fn create_default_config(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content()).with_context(|| {
        format!(
            "Failed to write default config file to {}",
            private_path(path)
        )
    })?;

    log_block_start!("Created default configuration: {}", private_path(path));
    Ok(())
}

/// Render the default configuration file.
pub(crate) fn default_config_content() -> String {
    ConfigBuilder::new()
        .add_section("Countdown")
        .add_setting(
            "rollover_hour",
            &DEFAULT_ROLLOVER_HOUR.to_string(),
            &format!(
                "Local hour after which tomorrow's sunset is shown ({MINIMUM_ROLLOVER_HOUR}-{MAXIMUM_ROLLOVER_HOUR})"
            ),
        )
        .add_setting(
            "show_seconds",
            &DEFAULT_SHOW_SECONDS.to_string(),
            "Render HH:MM:SS instead of HH:MM",
        )
        .add_setting(
            "label",
            &format!("\"{DEFAULT_LABEL}\""),
            "Text shown before today's countdown",
        )
        .add_setting(
            "tomorrow_label",
            &format!("\"{DEFAULT_TOMORROW_LABEL}\""),
            "Text shown before tomorrow's countdown",
        )
        .add_section("Location override")
        .add_commented_setting(
            "latitude",
            "41.008200",
            "Fixed latitude, skips IP geolocation (-90 to 90)",
        )
        .add_commented_setting(
            "longitude",
            "28.978400",
            "Fixed longitude, required with latitude (-180 to 180)",
        )
        .add_commented_setting(
            "timezone",
            "\"Europe/Istanbul\"",
            "IANA timezone for the fixed location",
        )
        .add_section("Network")
        .add_setting(
            "location_api_url",
            &format!("\"{DEFAULT_LOCATION_API_URL}\""),
            "IP geolocation service",
        )
        .add_setting(
            "sunset_api_url",
            &format!("\"{DEFAULT_SUNSET_API_URL}\""),
            "Sunset time service",
        )
        .add_setting(
            "request_timeout_secs",
            &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            &format!(
                "HTTP timeout in seconds ({MINIMUM_REQUEST_TIMEOUT_SECS}-{MAXIMUM_REQUEST_TIMEOUT_SECS})"
            ),
        )
        .add_setting(
            "retry_cooldown_secs",
            &DEFAULT_RETRY_COOLDOWN_SECS.to_string(),
            &format!(
                "Wait before retrying a failed day ({MINIMUM_RETRY_COOLDOWN_SECS}-{MAXIMUM_RETRY_COOLDOWN_SECS})"
            ),
        )
        .add_section("Storage")
        .add_commented_setting(
            "cache_file",
            &format!("\"~/.cache/{APP_NAME}/{CACHE_FILE_NAME}\""),
            "Sunset cache location",
        )
        .add_setting(
            "file_logging",
            &DEFAULT_FILE_LOGGING.to_string(),
            "Write a daily debug log next to the cache",
        )
        .build()
}

/// Builder for creating dynamically-aligned configuration files.
///
/// Comments are padded to a common column computed from the longest setting
/// line, so the layout stays aligned when defaults change.
struct ConfigBuilder {
    entries: Vec<EntryType>,
}

enum EntryType {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(EntryType::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(EntryType::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                EntryType::Setting { line, .. } => Some(line.len()),
                EntryType::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                EntryType::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                EntryType::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut output = result.join("\n");
        output.push('\n');
        output
    }
}
