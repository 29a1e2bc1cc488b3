//! Failure taxonomy for sunset resolution.
//!
//! Internals propagate `anyhow::Error` with context; the engine boundary maps
//! everything onto [`SunsetError`] so the caller can decide how to degrade.
//! None of these are fatal to the display loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SunsetError {
    /// Geolocation provider unreachable or returned something unusable.
    #[error("location lookup failed: {0:#}")]
    Location(anyhow::Error),

    /// Remote sunset API unreachable, non-OK status, or unparseable payload.
    #[error("sunset lookup failed: {0:#}")]
    Lookup(anyhow::Error),

    /// A persisted cache entry could not be parsed.
    #[error("corrupt cache entry for day {key}: {value:?}")]
    CacheCorruption { key: String, value: String },

    /// Writing the cache file failed. The in-memory cache stays valid.
    #[error("failed to persist sunset cache: {0:#}")]
    Persistence(anyhow::Error),
}

impl SunsetError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SunsetError::Location(_) => "LocationFailure",
            SunsetError::Lookup(_) => "LookupFailure",
            SunsetError::CacheCorruption { .. } => "CacheCorruption",
            SunsetError::Persistence(_) => "PersistenceFailure",
        }
    }
}
