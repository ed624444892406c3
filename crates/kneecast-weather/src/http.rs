//! Shared HTTP plumbing for the geocoding and weather clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::WeatherError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("Kneecast/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by every provider.
pub fn build_client(timeout: Duration) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherError::Unexpected {
            message: "failed to create HTTP client".to_string(),
            source: Some(Box::new(e)),
        })
}

/// Send `request` and decode a JSON body.
///
/// Non-2xx responses become `Http`, a blank body becomes `EmptyResult` and an
/// undecodable body becomes `Unexpected`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, WeatherError> {
    let response = request
        .send()
        .await
        .map_err(|e| WeatherError::from_reqwest(what, e))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::warn!("{} returned status {}", what, status);
        return Err(WeatherError::Http {
            status: status.as_u16(),
            message: format!("{} failed: {}", what, text.trim()),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| WeatherError::from_reqwest(what, e))?;

    if body.trim().is_empty() || body.trim() == "null" {
        return Err(WeatherError::empty(format!("{} returned an empty body", what)));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::debug!("{} parse error: {}", what, e);
        WeatherError::Unexpected {
            message: format!("{} returned an invalid body", what),
            source: Some(Box::new(e)),
        }
    })
}

/// Strip trailing slashes so `format!("{}/path", base)` never doubles them.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
