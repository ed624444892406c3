//! In-memory forecast cache with a fixed time-to-live.
//!
//! Entries are never evicted in the background; an expired entry is dropped
//! the next time it is looked up, or by [`WeatherCache::clear_expired`].

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::WeatherError;
use crate::types::{Coordinates, WeatherInfo};

pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Key a forecast is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_coordinates(coords: Coordinates) -> Self {
        // -0.0 + 0.0 == +0.0, so equal coordinates share a key
        Self(format!("coords_{}_{}", coords.latitude + 0.0, coords.longitude + 0.0))
    }

    pub fn for_address(address: &str) -> Self {
        Self(format!("address_{}", address.trim()))
    }

    /// Coordinates win when both are given; a blank address counts as absent.
    pub fn derive(address: Option<&str>, coords: Option<Coordinates>) -> Result<Self, WeatherError> {
        match (coords, address.filter(|a| !a.trim().is_empty())) {
            (Some(coords), _) => Ok(Self::for_coordinates(coords)),
            (None, Some(address)) => Ok(Self::for_address(address)),
            (None, None) => Err(WeatherError::input(
                "address or coordinates must be provided",
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    weather: WeatherInfo,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl WeatherCache {
    /// A zero `ttl` disables caching: nothing is ever served.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    /// Cached forecast for `key`, if stored less than `ttl` ago.
    pub fn get(&self, key: &CacheKey) -> Option<WeatherInfo> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => {
                tracing::debug!("Cache hit for {}", key);
                Some(entry.weather.clone())
            }
            Some(_) => {
                tracing::debug!("Cache entry for {} expired", key);
                entries.remove(key);
                None
            }
            None => {
                tracing::debug!("Cache miss for {}", key);
                None
            }
        }
    }

    /// Store `weather`, replacing any previous entry and restarting its clock.
    pub fn put(&self, key: CacheKey, weather: WeatherInfo) {
        let entry = CacheEntry {
            weather,
            stored_at: Instant::now(),
        };
        self.entries.lock().insert(key, entry);
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::DailyForecast;

    fn sample(name: &str) -> WeatherInfo {
        WeatherInfo {
            location_name: Some(name.to_string()),
            daily_forecasts: vec![DailyForecast {
                date: "2025-05-01".into(),
                icon_id: 2,
                min_temp: 10.0,
                max_temp: 20.0,
            }],
        }
    }

    #[test]
    fn test_key_prefers_coordinates() {
        let coords = Coordinates::new(35.681, 139.767);
        let key = CacheKey::derive(Some("Tokyo Station"), Some(coords)).unwrap();
        assert_eq!(key.as_str(), "coords_35.681_139.767");
    }

    #[test]
    fn test_key_ignores_sign_of_zero() {
        let positive = CacheKey::for_coordinates(Coordinates::new(0.0, 139.7));
        let negative = CacheKey::for_coordinates(Coordinates::new(-0.0, 139.7));
        assert_eq!(positive, negative);
        assert_eq!(negative.as_str(), "coords_0_139.7");
    }

    #[test]
    fn test_key_from_address() {
        let key = CacheKey::derive(Some("  Tokyo Station "), None).unwrap();
        assert_eq!(key, CacheKey::for_address("Tokyo Station"));
        assert_eq!(key.to_string(), "address_Tokyo Station");
    }

    #[test]
    fn test_key_requires_input() {
        let err = CacheKey::derive(None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);

        let err = CacheKey::derive(Some("   "), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_then_get() {
        let cache = WeatherCache::default();
        let key = CacheKey::for_address("Tokyo");

        cache.put(key.clone(), sample("Tokyo"));
        assert_eq!(cache.get(&key), Some(sample("Tokyo")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = WeatherCache::default();
        let key = CacheKey::for_address("Tokyo");
        cache.put(key.clone(), sample("Tokyo"));

        tokio::time::advance(Duration::from_secs(9 * 60 + 59)).await;
        assert!(cache.get(&key).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key).is_none());
        // Expired lookups drop the entry
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_and_restarts_clock() {
        let cache = WeatherCache::new(Duration::from_secs(60));
        let key = CacheKey::for_address("Kyoto");

        cache.put(key.clone(), sample("old"));
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.put(key.clone(), sample("new"));
        tokio::time::advance(Duration::from_secs(45)).await;

        assert_eq!(cache.get(&key), Some(sample("new")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_expired() {
        let cache = WeatherCache::new(Duration::from_secs(60));
        cache.put(CacheKey::for_address("a"), sample("a"));
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.put(CacheKey::for_address("b"), sample("b"));

        assert_eq!(cache.clear_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&CacheKey::for_address("b")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_disables_caching() {
        let cache = WeatherCache::new(Duration::ZERO);
        let key = CacheKey::for_address("x");
        cache.put(key.clone(), sample("x"));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = WeatherCache::default();
        let key = CacheKey::for_address("x");
        cache.put(key.clone(), sample("x"));
        cache.put(CacheKey::for_address("y"), sample("y"));

        assert!(cache.remove(&key));
        assert!(!cache.remove(&key));
        cache.clear();
        assert!(cache.is_empty());
    }
}
