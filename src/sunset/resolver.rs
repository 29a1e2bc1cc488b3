//! Turns a sunset service response into a [`SunsetRecord`].
//!
//! The service reports sunset as an absolute timestamp (usually UTC). When a
//! zone was requested and the response names a known `tzid`, the instant is
//! shown in that zone. Otherwise it is shown in the local offset in effect at
//! the sunset itself. Without a requested zone the service echoes `"UTC"`,
//! which is not the location's zone and is ignored. Every record that leaves
//! the resolver therefore carries a concrete offset.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};

use super::api::{SunsetApi, SunsetQuery, SunsetResponse};
use super::{RequestDate, SunsetRecord};
use crate::geo::Location;
use crate::time_source::TimeSource;

pub struct SunsetResolver<A> {
    api: A,
    clock: Arc<dyn TimeSource>,
    last_response: Mutex<Option<SunsetResponse>>,
}

impl<A: SunsetApi> SunsetResolver<A> {
    pub fn new(api: A, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            api,
            clock,
            last_response: Mutex::new(None),
        }
    }

    /// Look up the sunset for `location` on `date`. Single attempt, no retry.
    pub fn resolve(&self, location: &Location, date: RequestDate) -> Result<SunsetRecord> {
        let query = SunsetQuery {
            latitude: location.latitude,
            longitude: location.longitude,
            date,
            tzid: (!location.timezone.is_empty()).then(|| location.timezone.clone()),
        };

        let response = self.api.lookup(&query)?;
        let record = self
            .normalize(&response, query.tzid.is_some())
            .with_context(|| format!("service answered {}", raw_body(&response)))?;

        if let Ok(mut last) = self.last_response.lock() {
            *last = Some(response);
        }
        Ok(record)
    }

    /// Most recent response that produced a record.
    pub fn last_response(&self) -> Option<SunsetResponse> {
        self.last_response.lock().ok().and_then(|last| last.clone())
    }

    fn normalize(&self, response: &SunsetResponse, zone_requested: bool) -> Result<SunsetRecord> {
        if response.status != "OK" {
            anyhow::bail!("status {}", response.status);
        }

        let raw = response
            .sunset()
            .with_context(|| format!("response has no sunset field: {:?}", response.results))?;
        let instant = DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("unparseable sunset timestamp {raw:?}"))?;

        let echoed = response
            .tzid
            .as_deref()
            .filter(|tz| zone_requested && !tz.is_empty());
        let zoned = match echoed {
            Some(tzid) => match tzid.parse::<Tz>() {
                Ok(tz) => instant.with_timezone(&tz).fixed_offset(),
                Err(_) => {
                    log_warning!("Unknown timezone {tzid:?} in sunset response, using local time");
                    self.local(instant)
                }
            },
            None => self.local(instant),
        };

        Ok(SunsetRecord::new(zoned))
    }

    fn local(&self, instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.clock.offset_at(instant.with_timezone(&Utc)))
    }
}

/// The response as the service sent it, for error messages.
fn raw_body(response: &SunsetResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| format!("{response:?}"))
}
