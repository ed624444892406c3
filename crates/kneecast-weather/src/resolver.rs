//! Address-or-coordinates to forecast, with caching.

use std::time::Duration;

use tracing::instrument;

use crate::cache::{CacheKey, WeatherCache, DEFAULT_TTL};
use crate::error::WeatherError;
use crate::geocode::{GeocoderChain, ServerGeocoder, YahooGeocoder};
use crate::http::{build_client, DEFAULT_TIMEOUT};
use crate::provider::{WeatherProvider, WeatherSource};
use crate::types::{Coordinates, WeatherInfo};

/// Endpoints and limits used by [`WeatherResolver::from_settings`].
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub geocoder_url: String,
    pub weather_url: String,
    /// Secondary geocoder base URL and app id, if enabled.
    pub fallback: Option<(String, String)>,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl ResolverSettings {
    pub fn new(geocoder_url: impl Into<String>, weather_url: impl Into<String>) -> Self {
        Self {
            geocoder_url: geocoder_url.into(),
            weather_url: weather_url.into(),
            fallback: None,
            cache_ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, base_url: impl Into<String>, app_id: impl Into<String>) -> Self {
        self.fallback = Some((base_url.into(), app_id.into()));
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Composes geocoding, the weather fetch and the response cache.
pub struct WeatherResolver {
    geocoder: GeocoderChain,
    weather: Box<dyn WeatherSource>,
    cache: WeatherCache,
}

impl WeatherResolver {
    pub fn new(
        geocoder: GeocoderChain,
        weather: impl WeatherSource + 'static,
        cache: WeatherCache,
    ) -> Self {
        Self {
            geocoder,
            weather: Box::new(weather),
            cache,
        }
    }

    /// Build the HTTP-backed resolver. All providers share one client.
    pub fn from_settings(settings: &ResolverSettings) -> Result<Self, WeatherError> {
        let client = build_client(settings.timeout)?;

        let mut geocoder = GeocoderChain::new(ServerGeocoder::new(client.clone(), &settings.geocoder_url));
        if let Some((base_url, app_id)) = &settings.fallback {
            geocoder = geocoder.with_fallback(YahooGeocoder::new(client.clone(), base_url, app_id));
        }

        let weather = WeatherProvider::new(client, &settings.weather_url);

        tracing::debug!(
            "Resolver ready with geocoders [{}], cache ttl {:?}",
            geocoder.provider_names().join(", "),
            settings.cache_ttl
        );
        Ok(Self::new(geocoder, weather, WeatherCache::new(settings.cache_ttl)))
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn geocoder(&self) -> &GeocoderChain {
        &self.geocoder
    }

    /// Forecast for `coords`, or for `address` when no coordinates are given.
    ///
    /// A fresh cached forecast is returned without any network call. Failures
    /// are never cached.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve(
        &self,
        address: Option<&str>,
        coords: Option<Coordinates>,
    ) -> Result<WeatherInfo, WeatherError> {
        let key = CacheKey::derive(address, coords)?;

        if let Some(cached) = self.cache.get(&key) {
            tracing::info!("Serving cached forecast for {}", key);
            return Ok(cached);
        }

        let coords = match coords {
            Some(coords) => coords,
            None => {
                // derive() guarantees a non-blank address here
                let address = address.unwrap_or_default();
                self.geocoder
                    .resolve(address)
                    .await
                    .map_err(|e| WeatherError::geocoding(address.trim(), e))?
            }
        };

        let weather = self.weather.fetch(coords).await?;
        self.cache.put(key, weather.clone());
        Ok(weather)
    }

    /// Drop the cached forecast for this input, if any.
    pub fn invalidate(&self, address: Option<&str>, coords: Option<Coordinates>) -> bool {
        match CacheKey::derive(address, coords) {
            Ok(key) => self.cache.remove(&key),
            Err(_) => false,
        }
    }
}
