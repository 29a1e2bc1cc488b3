//! One full resolution cycle: locate, then look up the sunset for a day.

use chrono::NaiveDate;
use std::sync::Arc;

use super::api::{HttpSunsetApi, SunsetApi, SunsetResponse};
use super::resolver::SunsetResolver;
use super::{RequestDate, SunsetRecord};
use crate::config::Settings;
use crate::error::SunsetError;
use crate::geo::{self, LocationProvider};
use crate::time_source::TimeSource;

/// Resolves the sunset for a calendar day.
#[cfg_attr(test, mockall::automock)]
pub trait SunsetFetcher: Send {
    fn fetch(&self, date: NaiveDate) -> Result<SunsetRecord, SunsetError>;
}

impl<T: SunsetFetcher + ?Sized> SunsetFetcher for Box<T> {
    fn fetch(&self, date: NaiveDate) -> Result<SunsetRecord, SunsetError> {
        (**self).fetch(date)
    }
}

pub struct RemoteSunsetFetcher<A = HttpSunsetApi> {
    locator: Box<dyn LocationProvider>,
    resolver: SunsetResolver<A>,
}

impl RemoteSunsetFetcher<HttpSunsetApi> {
    /// Build the network-backed fetcher described by the settings.
    pub fn from_settings(
        settings: &Settings,
        clock: Arc<dyn TimeSource>,
    ) -> anyhow::Result<Self> {
        let locator = geo::provider_from_settings(settings)?;
        let api = HttpSunsetApi::new(&settings.sunset_api_url, settings.request_timeout_secs)?;
        Ok(Self::new(locator, SunsetResolver::new(api, clock)))
    }
}

impl<A: SunsetApi> RemoteSunsetFetcher<A> {
    pub fn new(locator: Box<dyn LocationProvider>, resolver: SunsetResolver<A>) -> Self {
        Self { locator, resolver }
    }

    /// Resolve for an explicit request date, used by diagnostics.
    pub fn fetch_request(&self, date: RequestDate) -> Result<SunsetRecord, SunsetError> {
        let location = self.locator.locate().map_err(SunsetError::Location)?;
        log_debug!("Resolving sunset for {} at {}", date, location.describe());

        self.resolver.resolve(&location, date).map_err(|e| {
            SunsetError::Lookup(e.context(format!("{} on {date}", location.describe())))
        })
    }

    pub fn locator(&self) -> &dyn LocationProvider {
        self.locator.as_ref()
    }

    pub fn last_response(&self) -> Option<SunsetResponse> {
        self.resolver.last_response()
    }
}

impl<A: SunsetApi> SunsetFetcher for RemoteSunsetFetcher<A> {
    fn fetch(&self, date: NaiveDate) -> Result<SunsetRecord, SunsetError> {
        self.fetch_request(RequestDate::On(date))
    }
}
