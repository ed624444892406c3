//! Weather lookups for Kneecast
//!
//! Resolves an address or a coordinate pair to a multi-day forecast, with
//! geocoding provider fallback and a short-lived in-memory cache.

pub mod cache;
pub mod error;
pub mod format;
pub mod geocode;
pub mod http;
pub mod provider;
pub mod resolver;
pub mod types;

pub use cache::{CacheKey, WeatherCache, DEFAULT_TTL};
pub use error::{ErrorKind, WeatherError};
pub use format::{format_date, format_temperature};
pub use geocode::{Geocoder, GeocoderChain, ServerGeocoder, YahooGeocoder};
pub use http::{build_client, DEFAULT_TIMEOUT};
pub use provider::{WeatherProvider, WeatherSource};
pub use resolver::{ResolverSettings, WeatherResolver};
pub use types::*;
