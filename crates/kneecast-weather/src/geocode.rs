//! Forward geocoding: convert a free-text address into coordinates.
//!
//! Two providers are supported: the project's own geocoding server and a
//! legacy Yahoo-style geocoder. [`GeocoderChain`] tries them in order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http::{fetch_json, normalize_base_url};
use crate::types::Coordinates;

const YAHOO_GEOCODER_PATH: &str = "/geocode/V1/geoCoder";

/// A single geocoding backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Resolve `address` to the first candidate location.
    async fn geocode(&self, address: &str) -> Result<Coordinates, WeatherError>;
}

fn require_address(address: &str) -> Result<&str, WeatherError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::input("address must not be empty"));
    }
    Ok(trimmed)
}

#[derive(Debug, Deserialize)]
struct GoLocation {
    #[serde(default)]
    name: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// The server answers either with a bare list or with `{"locations": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GoGeocodeResponse {
    List(Vec<GoLocation>),
    Wrapped { locations: Vec<GoLocation> },
}

impl GoGeocodeResponse {
    fn into_locations(self) -> Vec<GoLocation> {
        match self {
            Self::List(locations) | Self::Wrapped { locations } => locations,
        }
    }
}

/// Geocoder backed by `GET {base}/geocode?address=...`.
#[derive(Debug, Clone)]
pub struct ServerGeocoder {
    client: Client,
    base_url: String,
}

impl ServerGeocoder {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl Geocoder for ServerGeocoder {
    fn name(&self) -> &str {
        "server"
    }

    #[instrument(skip(self), level = "info")]
    async fn geocode(&self, address: &str) -> Result<Coordinates, WeatherError> {
        let address = require_address(address)?;
        let url = format!("{}/geocode", self.base_url);

        let request = self.client.get(&url).query(&[("address", address)]);
        let body: GoGeocodeResponse = fetch_json(request, "geocode request").await?;
        let locations = body.into_locations();

        tracing::info!("Geocoder returned {} candidate(s) for {}", locations.len(), address);

        // Pick the first candidate
        let first = locations
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::empty(format!("no locations found for '{}'", address)))?;

        tracing::debug!(
            "Using candidate {} ({}, {})",
            first.name.as_deref().unwrap_or("<unnamed>"),
            first.latitude,
            first.longitude
        );

        Ok(Coordinates::new(first.latitude, first.longitude))
    }
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    #[serde(rename = "Feature", default)]
    features: Vec<YahooFeature>,
}

#[derive(Debug, Deserialize)]
struct YahooFeature {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Geometry")]
    geometry: YahooGeometry,
}

#[derive(Debug, Deserialize)]
struct YahooGeometry {
    /// "longitude,latitude"
    #[serde(rename = "Coordinates")]
    coordinates: String,
}

/// Parse Yahoo's `"lon,lat"` pair.
fn parse_lon_lat(raw: &str) -> Option<Coordinates> {
    let mut parts = raw.split(',').map(str::trim);
    let lon = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    Some(Coordinates::new(lat, lon))
}

/// Legacy geocoder with the Yahoo! geocoder API shape.
#[derive(Debug, Clone)]
pub struct YahooGeocoder {
    client: Client,
    base_url: String,
    app_id: String,
}

impl YahooGeocoder {
    pub fn new(client: Client, base_url: &str, app_id: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
            app_id: app_id.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for YahooGeocoder {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self), level = "info")]
    async fn geocode(&self, address: &str) -> Result<Coordinates, WeatherError> {
        let address = require_address(address)?;
        let url = format!("{}{}", self.base_url, YAHOO_GEOCODER_PATH);

        let request = self.client.get(&url).query(&[
            ("appid", self.app_id.as_str()),
            ("query", address),
            ("output", "json"),
            ("al", "2"),
        ]);
        let body: YahooResponse = fetch_json(request, "fallback geocode request").await?;

        body.features
            .iter()
            .find_map(|feature| {
                let coords = parse_lon_lat(&feature.geometry.coordinates);
                if coords.is_none() {
                    tracing::debug!(
                        "Skipping feature {:?} with unparseable coordinates {:?}",
                        feature.name,
                        feature.geometry.coordinates
                    );
                }
                coords
            })
            .ok_or_else(|| WeatherError::empty(format!("no locations found for '{}'", address)))
    }
}

/// Ordered list of geocoders.
///
/// The next provider is consulted only when the previous one failed with a
/// connection, timeout or HTTP error. Any other failure ends the chain.
pub struct GeocoderChain {
    providers: Vec<Box<dyn Geocoder>>,
}

impl GeocoderChain {
    pub fn new(primary: impl Geocoder + 'static) -> Self {
        Self {
            providers: vec![Box::new(primary)],
        }
    }

    /// Append a provider tried after every provider already in the chain.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Geocoder + 'static) -> Self {
        self.providers.push(Box::new(fallback));
        self
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve `address` using the first provider that succeeds.
    pub async fn resolve(&self, address: &str) -> Result<Coordinates, WeatherError> {
        let address = require_address(address)?;

        let mut last_error = None;
        for provider in &self.providers {
            match provider.geocode(address).await {
                Ok(coords) => {
                    tracing::info!("Geocoded '{}' via {} to {}", address, provider.name(), coords);
                    return Ok(coords);
                }
                Err(e) if e.allows_fallback() => {
                    tracing::warn!("Geocoder {} failed, trying next: {}", provider.name(), e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| WeatherError::unexpected("no geocoding providers configured")))
    }
}
