//! Blocking HTTP client shared by the geolocation and sunset lookups.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use std::time::Duration;

/// Build a client with the configured request timeout.
pub fn client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("sunset-clock/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Fail on any status other than 200.
pub fn require_ok(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        anyhow::bail!("{url} answered HTTP {status}");
    }
    Ok(response)
}
