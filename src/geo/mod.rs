//! Location lookup for the sunset resolver.
//!
//! A [`LocationProvider`] produces the coordinates (and, when known, the IANA
//! timezone) that sunset lookups are made for. Two providers exist:
//!
//! - [`IpApiLocator`]: IP geolocation over HTTP, with a coordinates-only fallback
//! - [`FixedLocator`]: coordinates taken from the configuration file
//!
//! Locations are never cached; every resolution cycle asks the provider again.

pub mod ipapi;

use anyhow::Result;

use crate::config::{LocationOverride, Settings};

pub use ipapi::IpApiLocator;

/// Geographic position used for sunset lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
    /// IANA timezone id, or empty when the provider did not report one.
    pub timezone: String,
}

impl Location {
    /// Create a location, rejecting coordinates outside ±90/±180.
    pub fn new(
        latitude: f64,
        longitude: f64,
        city: impl Into<String>,
        country: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("latitude must be between -90 and 90 degrees (got {latitude})");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("longitude must be between -180 and 180 degrees (got {longitude})");
        }
        Ok(Self {
            latitude,
            longitude,
            city: city.into(),
            country: country.into(),
            timezone: timezone.into(),
        })
    }

    /// Build a coordinates-only location from a `"lat,lng"` string.
    pub fn from_lat_lng_str(lat_lng: &str) -> Result<Self> {
        let parts: Vec<&str> = lat_lng.trim().split(',').collect();
        let [lat, lng] = parts.as_slice() else {
            anyhow::bail!("expected \"lat,lng\", got {lat_lng:?}");
        };

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid latitude {lat:?}: {e}"))?;
        let longitude: f64 = lng
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid longitude {lng:?}: {e}"))?;

        Self::new(latitude, longitude, "", "", "")
    }

    /// Human readable place name for log output.
    pub fn describe(&self) -> String {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        let coords = format!(
            "{:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        );
        match (self.city.is_empty(), self.country.is_empty()) {
            (false, false) => format!("{}, {} ({coords})", self.city, self.country),
            (false, true) => format!("{} ({coords})", self.city),
            _ => coords,
        }
    }
}

/// Source of the current location.
#[cfg_attr(test, mockall::automock)]
pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> Result<Location>;
}

/// Serves the coordinates configured by the user.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    location: Location,
}

impl FixedLocator {
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    pub fn from_override(fixed: &LocationOverride) -> Result<Self> {
        let timezone = fixed.timezone.map(|tz| tz.name().to_string());
        Ok(Self::new(Location::new(
            fixed.latitude,
            fixed.longitude,
            "",
            "",
            timezone.unwrap_or_default(),
        )?))
    }
}

impl LocationProvider for FixedLocator {
    fn locate(&self) -> Result<Location> {
        Ok(self.location.clone())
    }
}

/// Pick the provider implied by the settings.
pub fn provider_from_settings(settings: &Settings) -> Result<Box<dyn LocationProvider>> {
    match &settings.location {
        Some(fixed) => Ok(Box::new(FixedLocator::from_override(fixed)?)),
        None => Ok(Box::new(IpApiLocator::new(
            &settings.location_api_url,
            settings.request_timeout_secs,
        )?)),
    }
}
