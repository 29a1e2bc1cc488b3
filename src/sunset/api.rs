//! Remote sunset service (sunrise-sunset.org compatible).

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::RequestDate;
use crate::common::http;

/// Parameters of one sunset lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SunsetQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub date: RequestDate,
    /// Sent as `tzid` when present.
    pub tzid: Option<String>,
}

impl SunsetQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lat", self.latitude.to_string()),
            ("lng", self.longitude.to_string()),
            ("formatted", "0".to_string()),
            ("date", self.date.as_param()),
        ];
        if let Some(tzid) = self.tzid.as_deref().filter(|tz| !tz.is_empty()) {
            params.push(("tzid", tzid.to_string()));
        }
        params
    }
}

/// Raw service response.
///
/// `results` is an object on success and an empty string on errors such as
/// `INVALID_REQUEST`, so it is kept untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunsetResponse {
    pub status: String,
    #[serde(default)]
    pub results: serde_json::Value,
    #[serde(default)]
    pub tzid: Option<String>,
}

impl SunsetResponse {
    pub fn sunset(&self) -> Option<&str> {
        self.results.get("sunset").and_then(|v| v.as_str())
    }

    pub fn sunrise(&self) -> Option<&str> {
        self.results.get("sunrise").and_then(|v| v.as_str())
    }
}

/// Transport for sunset lookups.
#[cfg_attr(test, mockall::automock)]
pub trait SunsetApi: Send + Sync {
    fn lookup(&self, query: &SunsetQuery) -> Result<SunsetResponse>;
}

impl<T: SunsetApi + ?Sized> SunsetApi for Box<T> {
    fn lookup(&self, query: &SunsetQuery) -> Result<SunsetResponse> {
        (**self).lookup(query)
    }
}

pub struct HttpSunsetApi {
    client: Client,
    url: String,
}

impl HttpSunsetApi {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout_secs)?,
            url: url.to_string(),
        })
    }
}

impl SunsetApi for HttpSunsetApi {
    fn lookup(&self, query: &SunsetQuery) -> Result<SunsetResponse> {
        let params = query.params();
        log_debug!("Requesting sunset from {} with {:?}", self.url, params);

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .with_context(|| format!("request to {} failed", self.url))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("reading body from {} failed", self.url))?;

        parse_response(&body, status.as_u16())
            .with_context(|| format!("{} answered HTTP {status}", self.url))
    }
}

/// Decode a response body. Anything but HTTP 200 fails, naming the service
/// status when the error body carries one.
pub(crate) fn parse_response(body: &str, http_status: u16) -> Result<SunsetResponse> {
    let parsed = serde_json::from_str::<SunsetResponse>(body);
    if http_status != 200 {
        match parsed {
            Ok(response) => anyhow::bail!("status {}", response.status),
            Err(_) => anyhow::bail!("unexpected response body: {body}"),
        }
    }
    parsed.with_context(|| format!("malformed sunset response: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_query_params() {
        let query = SunsetQuery {
            latitude: 41.0082,
            longitude: 28.9784,
            date: RequestDate::On(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            tzid: Some("Europe/Istanbul".to_string()),
        };
        let params = query.params();
        assert!(params.contains(&("formatted", "0".to_string())));
        assert!(params.contains(&("date", "2024-03-15".to_string())));
        assert!(params.contains(&("tzid", "Europe/Istanbul".to_string())));

        let without_tz = SunsetQuery {
            tzid: Some(String::new()),
            date: RequestDate::Today,
            ..query
        };
        let params = without_tz.params();
        assert!(params.iter().all(|(k, _)| *k != "tzid"));
        assert!(params.contains(&("date", "today".to_string())));
    }

    #[test]
    fn test_response_deserializes() {
        let body = r#"{
            "results": {
                "sunrise": "2024-03-15T04:11:10+00:00",
                "sunset": "2024-03-15T15:42:00+00:00",
                "solar_noon": "2024-03-15T09:56:35+00:00",
                "day_length": 41450
            },
            "status": "OK",
            "tzid": "UTC"
        }"#;
        let response = parse_response(body, 200).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.tzid.as_deref(), Some("UTC"));
        assert_eq!(response.sunset(), Some("2024-03-15T15:42:00+00:00"));
        assert_eq!(response.sunrise(), Some("2024-03-15T04:11:10+00:00"));
    }

    #[test]
    fn test_error_status_survives_http_400() {
        let err = parse_response(r#"{"results": "", "status": "INVALID_REQUEST"}"#, 400)
            .unwrap_err();
        assert_eq!(err.to_string(), "status INVALID_REQUEST");

        let response =
            parse_response(r#"{"results": "", "status": "INVALID_DATE"}"#, 200).unwrap();
        assert_eq!(response.status, "INVALID_DATE");
        assert_eq!(response.sunset(), None);
    }

    #[test]
    fn test_non_json_body_is_an_error() {
        assert!(parse_response("<html>502 Bad Gateway</html>", 502).is_err());
        let err = parse_response("{\"status\":", 200).unwrap_err();
        assert!(format!("{err:#}").contains("malformed sunset response"));
    }
}
