//! End-to-end resolver tests against mock geocoding and weather servers.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use kneecast_weather::{
    Coordinates, ErrorKind, ResolverSettings, SummaryIcon, WeatherError, WeatherResolver,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Seven days of forecast in the multi-day shape.
fn week_forecast(location: &str) -> serde_json::Value {
    let data: Vec<_> = (1..=7)
        .map(|day| {
            serde_json::json!({
                "day": format!("2025-05-{:02}", day),
                "all_day": {
                    "icon": day + 1,
                    "temperature_min": 10.0 + day as f64,
                    "temperature_max": 20.0 + day as f64
                }
            })
        })
        .collect();

    serde_json::json!({
        "location_name": location,
        "daily": {"data": data}
    })
}

fn tokyo_station() -> serde_json::Value {
    serde_json::json!([
        {"name": "Tokyo Station", "latitude": 35.681, "longitude": 139.767},
        {"name": "Tokyo Station Hotel", "latitude": 35.680, "longitude": 139.766}
    ])
}

fn resolver_for(server: &MockServer) -> WeatherResolver {
    let settings = ResolverSettings::new(server.uri(), server.uri()).with_timeout(Duration::from_secs(5));
    WeatherResolver::from_settings(&settings).unwrap()
}

#[tokio::test]
async fn test_address_to_week_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("address", "Tokyo Station"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_station()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "35.681"))
        .and(query_param("lon", "139.767"))
        .respond_with(ResponseTemplate::new(200).set_body_json(week_forecast("Chiyoda")))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let info = resolver.resolve(Some("Tokyo Station"), None).await.unwrap();

    assert_eq!(info.location_name.as_deref(), Some("Chiyoda"));
    assert_eq!(info.daily_forecasts.len(), 7);
    assert_eq!(info.daily_forecasts[0].date, "2025-05-01");
    assert_eq!(info.daily_forecasts[6].max_temp, 27.0);
}

#[tokio::test]
async fn test_warm_cache_makes_no_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_station()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(week_forecast("Chiyoda")))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let first = resolver.resolve(Some("Tokyo Station"), None).await.unwrap();
    let second = resolver.resolve(Some("Tokyo Station"), None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(resolver.cache().len(), 1);
}

#[tokio::test]
async fn test_coordinates_skip_geocoding() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_station()))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "34.69"))
        .and(query_param("lon", "135.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(week_forecast("Osaka")))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let coords = Coordinates::new(34.69, 135.5);

    let first = resolver.resolve(None, Some(coords)).await.unwrap();
    let second = resolver.resolve(None, Some(coords)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.location_name.as_deref(), Some("Osaka"));
}

#[tokio::test]
async fn test_missing_input_makes_no_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve(None, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("address or coordinates must be provided"));
}

#[tokio::test]
async fn test_no_candidates_skips_weather() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"locations": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(week_forecast("x")))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve(Some("Atlantis"), None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyResult);
    assert!(matches!(err, WeatherError::Geocoding { .. }));
    assert!(err.to_string().contains("Atlantis"));
}

#[tokio::test]
async fn test_weather_error_leaves_cache_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let err = resolver
        .resolve(None, Some(Coordinates::new(35.0, 139.0)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status(), Some(500));
    assert!(resolver.cache().is_empty());
}

#[tokio::test]
async fn test_legacy_summary_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location_name": "Sapporo",
            "target_date": "2025-05-01",
            "weather_summary": "曇り",
            "temperature_max": 15.2,
            "temperature_min": 6.8
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let info = resolver
        .resolve(None, Some(Coordinates::new(43.06, 141.35)))
        .await
        .unwrap();

    assert_eq!(info.daily_forecasts.len(), 1);
    assert_eq!(info.daily_forecasts[0].icon_id, SummaryIcon::Cloudy.code());
    assert_eq!(info.daily_forecasts[0].max_temp, 15.2);
}

#[tokio::test]
async fn test_fallback_geocoder_on_server_error() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&primary)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "35.681"))
        .and(query_param("lon", "139.767"))
        .respond_with(ResponseTemplate::new(200).set_body_json(week_forecast("Chiyoda")))
        .expect(1)
        .mount(&primary)
        .await;

    Mock::given(method("GET"))
        .and(path("/geocode/V1/geoCoder"))
        .and(query_param("appid", "test-app"))
        .and(query_param("query", "Tokyo Station"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Feature": [
                {"Name": "Tokyo Station", "Geometry": {"Coordinates": "139.767,35.681"}}
            ]
        })))
        .expect(1)
        .mount(&fallback)
        .await;

    let settings = ResolverSettings::new(primary.uri(), primary.uri())
        .with_fallback(fallback.uri(), "test-app")
        .with_timeout(Duration::from_secs(5));
    let resolver = WeatherResolver::from_settings(&settings).unwrap();

    let info = resolver.resolve(Some("Tokyo Station"), None).await.unwrap();
    assert_eq!(info.daily_forecasts.len(), 7);
}
