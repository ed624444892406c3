use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::http::{fetch_json, normalize_base_url};
use crate::types::{Coordinates, DailyForecast, SummaryIcon, WeatherInfo};

/// Source of forecasts for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, coords: Coordinates) -> Result<WeatherInfo, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ServerWeatherResponse {
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default)]
    daily: Option<ServerDaily>,
    // Legacy single-day fields
    #[serde(default)]
    target_date: Option<String>,
    #[serde(default)]
    weather_summary: Option<String>,
    #[serde(default)]
    temperature_min: Option<f64>,
    #[serde(default)]
    temperature_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ServerDaily {
    #[serde(default)]
    data: Vec<ServerDay>,
}

#[derive(Debug, Deserialize)]
struct ServerDay {
    day: String,
    all_day: ServerAllDay,
}

#[derive(Debug, Deserialize)]
struct ServerAllDay {
    icon: i32,
    temperature_min: f64,
    temperature_max: f64,
}

/// Convert a server payload into [`WeatherInfo`].
///
/// A `daily` block maps one-to-one; otherwise a single day is synthesised
/// from the legacy summary fields.
fn into_weather_info(response: ServerWeatherResponse) -> Result<WeatherInfo, WeatherError> {
    let location_name = response.location_name.filter(|n| !n.trim().is_empty());

    let daily_forecasts = match (response.daily, response.target_date) {
        (Some(daily), _) => daily
            .data
            .into_iter()
            .map(|d| DailyForecast {
                date: d.day,
                icon_id: d.all_day.icon,
                min_temp: d.all_day.temperature_min,
                max_temp: d.all_day.temperature_max,
            })
            .collect::<Vec<_>>(),
        (None, Some(target_date)) => {
            let icon = SummaryIcon::from_summary(response.weather_summary.as_deref());
            vec![DailyForecast {
                date: target_date,
                icon_id: icon.code(),
                min_temp: response.temperature_min.unwrap_or(0.0),
                max_temp: response.temperature_max.unwrap_or(0.0),
            }]
        }
        (None, None) => Vec::new(),
    };

    if daily_forecasts.is_empty() {
        return Err(WeatherError::empty("weather response contained no forecast"));
    }

    Ok(WeatherInfo {
        location_name,
        daily_forecasts,
    })
}

/// Weather client backed by `GET {base}/weather?lat=..&lon=..`.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, coords: Coordinates) -> Result<WeatherInfo, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        tracing::info!("Fetching weather for ({})", coords);

        let request = self
            .client
            .get(&url)
            .query(&[("lat", coords.latitude), ("lon", coords.longitude)]);
        let body: ServerWeatherResponse = fetch_json(request, "weather request").await?;
        let info = into_weather_info(body)?;

        tracing::info!(
            "Weather for {} with {} day(s)",
            info.location_name.as_deref().unwrap_or("<unnamed>"),
            info.daily_forecasts.len()
        );
        Ok(info)
    }
}
