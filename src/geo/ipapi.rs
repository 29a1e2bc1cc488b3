//! IP geolocation via an ipapi.co compatible service.
//!
//! `{base}/json/` returns the full record. When it fails, `{base}/latlong/`
//! still yields a plain `"lat,lng"` body, which is enough to look up a sunset
//! (the sunset service then reports times without a timezone and they are
//! shown in local time).

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Location, LocationProvider};
use crate::common::http;

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    timezone: Option<String>,
    /// Set by ipapi.co on rate limiting and other refusals.
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

pub struct IpApiLocator {
    client: Client,
    base_url: String,
}

impl IpApiLocator {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn fetch_full(&self) -> Result<Location> {
        let url = format!("{}/json/", self.base_url);
        log_debug!("Requesting location from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let body = http::require_ok(response, &url)?
            .text()
            .with_context(|| format!("reading body from {url} failed"))?;
        parse_full_response(&body)
    }

    fn fetch_lat_lng(&self) -> Result<Location> {
        let url = format!("{}/latlong/", self.base_url);
        log_debug!("Requesting coordinates from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let body = http::require_ok(response, &url)?
            .text()
            .with_context(|| format!("reading body from {url} failed"))?;
        Location::from_lat_lng_str(&body)
    }
}

impl LocationProvider for IpApiLocator {
    fn locate(&self) -> Result<Location> {
        locate_with_fallback(|| self.fetch_full(), || self.fetch_lat_lng())
    }
}

/// Try the full lookup first, then the coordinates-only one.
pub(crate) fn locate_with_fallback(
    full: impl FnOnce() -> Result<Location>,
    lat_lng: impl FnOnce() -> Result<Location>,
) -> Result<Location> {
    match full() {
        Ok(location) => {
            log_debug!("Location found: {}", location.describe());
            Ok(location)
        }
        Err(full_err) => {
            log_warning!("Full location lookup failed: {full_err:#}");
            log_indented!("Falling back to coordinates-only lookup");
            let location = lat_lng().with_context(|| {
                format!("coordinates-only lookup failed after: {full_err:#}")
            })?;
            log_debug!("Location found: {}", location.describe());
            Ok(location)
        }
    }
}

/// Parse the `/json/` payload into a location.
pub(crate) fn parse_full_response(body: &str) -> Result<Location> {
    let data: IpApiResponse =
        serde_json::from_str(body).context("location response is not valid JSON")?;

    if data.error {
        anyhow::bail!(
            "location service refused the request: {}",
            data.reason.as_deref().unwrap_or("no reason given")
        );
    }

    let (Some(latitude), Some(longitude)) = (data.latitude, data.longitude) else {
        anyhow::bail!("location response has no coordinates: {body}");
    };

    Location::new(
        latitude,
        longitude,
        data.city.unwrap_or_else(|| "Unknown".to_string()),
        data.country_name.unwrap_or_else(|| "Unknown".to_string()),
        data.timezone.unwrap_or_default(),
    )
}
