//! Display helpers for forecast values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Render an ISO date or date-time as `YYYY/MM/DD`.
///
/// Input that does not parse is returned unchanged.
pub fn format_date(value: &str) -> String {
    let trimmed = value.trim();

    let date = DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%Y/%m/%d").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Format a temperature in Celsius with one decimal.
pub fn format_temperature(celsius: f64) -> String {
    format!("{:.1}°C", celsius)
}
