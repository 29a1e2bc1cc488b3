//! Configuration validation functionality.
//!
//! Rejects out-of-range values and half-specified locations before defaults
//! are merged in.

use anyhow::Result;
use chrono_tz::Tz;

use super::Config;
use crate::common::constants::*;

/// Validate every field that is present in the configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(hour) = config.rollover_hour
        && !(MINIMUM_ROLLOVER_HOUR..=MAXIMUM_ROLLOVER_HOUR).contains(&hour)
    {
        anyhow::bail!(
            "rollover_hour ({}) must be between {} and {}",
            hour,
            MINIMUM_ROLLOVER_HOUR,
            MAXIMUM_ROLLOVER_HOUR
        );
    }

    if let Some(timeout) = config.request_timeout_secs
        && !(MINIMUM_REQUEST_TIMEOUT_SECS..=MAXIMUM_REQUEST_TIMEOUT_SECS).contains(&timeout)
    {
        anyhow::bail!(
            "request_timeout_secs ({}) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT_SECS,
            MAXIMUM_REQUEST_TIMEOUT_SECS
        );
    }

    if let Some(cooldown) = config.retry_cooldown_secs
        && !(MINIMUM_RETRY_COOLDOWN_SECS..=MAXIMUM_RETRY_COOLDOWN_SECS).contains(&cooldown)
    {
        anyhow::bail!(
            "retry_cooldown_secs ({}) must be between {} and {} seconds",
            cooldown,
            MINIMUM_RETRY_COOLDOWN_SECS,
            MAXIMUM_RETRY_COOLDOWN_SECS
        );
    }

    validate_location(config)?;
    validate_urls(config)?;

    Ok(())
}

fn validate_location(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => {}
    }

    if let Some(tz) = config.timezone.as_deref()
        && !tz.is_empty()
    {
        if config.latitude.is_none() {
            anyhow::bail!("timezone is only used together with latitude and longitude");
        }
        if tz.parse::<Tz>().is_err() {
            anyhow::bail!("timezone '{}' is not a known IANA timezone", tz);
        }
    }

    Ok(())
}

fn validate_urls(config: &Config) -> Result<()> {
    for (name, value) in [
        ("location_api_url", &config.location_api_url),
        ("sunset_api_url", &config.sunset_api_url),
    ] {
        if let Some(url) = value
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            anyhow::bail!("{} must be an http(s) URL (got '{}')", name, url);
        }
    }
    Ok(())
}
