//! Implementation of the status command.
//!
//! A one-shot diagnostic that walks the whole resolution chain in the
//! foreground: location, today's sunset straight from the service, the
//! countdown the engine would show right now, and what the cache holds.

use anyhow::Result;
use chrono::Duration;

use crate::commands::load_settings;
use crate::common::utils::private_path;
use crate::core::{EngineSettings, InlineDispatch, SunsetEngine};
use crate::io::instance;
use crate::state::SunsetCache;
use crate::sunset::{RemoteSunsetFetcher, RequestDate};
use crate::time_source::{self, TimeSource};

/// Handle the status command.
pub fn handle_status_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    match instance::get_running_instance() {
        Ok(Some(info)) => log_block_start!("Clock running (PID: {})", info.pid),
        Ok(None) => log_block_start!("Clock not running"),
        Err(e) => log_block_start!("Clock state unknown: {e}"),
    }

    let settings = load_settings()?;
    if debug_enabled {
        settings.log_settings();
    }

    let clock = time_source::system();
    let now = clock.now();
    log_block_start!("Current time: {}", now.format("%Y-%m-%d %H:%M:%S %:z"));

    let fetcher = RemoteSunsetFetcher::from_settings(&settings, clock.clone())?;

    log_block_start!("Location");
    match fetcher.locator().locate() {
        Ok(location) => {
            log_decorated!("{}", location.describe());
            log_indented!("Coordinates: {:.4}, {:.4}", location.latitude, location.longitude);
            if !location.timezone.is_empty() {
                log_indented!("Timezone: {}", location.timezone);
            }
        }
        Err(e) => log_error!("{e:#}"),
    }

    log_block_start!("Today's sunset (uncached)");
    match fetcher.fetch_request(RequestDate::Today) {
        Ok(record) => {
            if let Some(response) = fetcher.last_response() {
                log_decorated!("Service status: {}", response.status);
                if let Some(sunrise) = response.sunrise() {
                    log_indented!("Sunrise (raw): {sunrise}");
                }
                log_indented!("Sunset (raw): {}", response.sunset().unwrap_or("-"));
            }
            log_decorated!("Sunset: {record}");
            let left = record.instant() - now;
            if left > Duration::zero() {
                log_indented!("Time until sunset: {}", describe_duration(left));
            } else {
                log_indented!("Sunset has already passed for today");
            }
        }
        Err(e) => log_error!("{}: {e}", e.kind()),
    }

    log_block_start!("Engine");
    let cache = SunsetCache::load(&settings.cache_file);
    let mut engine = SunsetEngine::new(
        clock,
        cache,
        Box::new(InlineDispatch::new(fetcher)),
        EngineSettings::from(&settings),
    );
    let countdown = engine.formatted_remaining_time();
    log_decorated!("Display: {countdown}");
    log_indented!("Target: {}", engine.target());
    if let Some(error) = engine.last_error() {
        log_indented!("Last error: {error}");
    }

    log_block_start!(
        "Cache: {} ({} entries)",
        private_path(engine.cache().path()),
        engine.cache().len()
    );
    for (day, record) in engine.cache().entries() {
        log_indented!("Day {day:>3}: {record}");
    }

    log_end!();
    Ok(())
}

fn describe_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

/// Display detailed help for the status command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("status - Diagnose sunset resolution");
    log_block_start!("Usage: sunset-clock status");
    log_block_start!("Description:");
    log_indented!("Resolves the location and today's sunset directly, then shows");
    log_indented!("the countdown the clock would display and the cached entries.");
    log_indented!("Add --debug to include the loaded configuration and request details.");
    log_end!();
}
