//! Command-line command handlers for sunset-clock.
//!
//! Each one-shot command (refresh, stop, status, cache, help) lives in its own
//! submodule. Running the clock itself is handled by [`crate::clock`].

pub mod cache;
pub mod help;
pub mod refresh;
pub mod status;
pub mod stop;

use anyhow::Result;

use crate::config::{Config, Settings};

/// Load the configuration (honoring `--config`) and apply defaults.
pub(crate) fn load_settings() -> Result<Settings> {
    Ok(Config::load()?.resolve())
}
