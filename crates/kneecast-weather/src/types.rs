use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One day of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Date as sent by the weather server (ISO date or date-time)
    pub date: String,
    /// Icon code, see [`icon_label`]
    pub icon_id: i32,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// Forecast for one place, oldest day first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub location_name: Option<String>,
    pub daily_forecasts: Vec<DailyForecast>,
}

/// Icons the legacy single-day payload can be mapped to.
///
/// Codes share the numbering of the multi-day `icon` field so both shapes
/// render through [`icon_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryIcon {
    #[default]
    Sunny,
    Cloudy,
    Rain,
    Snow,
    Storm,
}

impl SummaryIcon {
    /// Keyword table, checked in order. First hit wins.
    const KEYWORDS: [(SummaryIcon, &'static [&'static str]); 5] = [
        (SummaryIcon::Sunny, &["晴", "sun", "clear"]),
        (SummaryIcon::Cloudy, &["曇", "cloud"]),
        (SummaryIcon::Rain, &["雨", "rain"]),
        (SummaryIcon::Snow, &["雪", "snow"]),
        (SummaryIcon::Storm, &["嵐", "雷", "storm", "thunder"]),
    ];

    /// Guess an icon from a free-text summary such as "曇り時々晴れ".
    ///
    /// Unknown or missing summaries fall back to `Sunny`.
    pub fn from_summary(summary: Option<&str>) -> Self {
        let Some(summary) = summary else {
            return Self::default();
        };
        let lowered = summary.to_lowercase();

        Self::KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
            .map(|(icon, _)| *icon)
            .unwrap_or_default()
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Sunny => 2,
            Self::Cloudy => 6,
            Self::Rain => 11,
            Self::Snow => 17,
            Self::Storm => 14,
        }
    }
}

/// Short description for a forecast icon code.
pub fn icon_label(code: i32) -> &'static str {
    match code {
        2 => "Sunny",
        3 => "Mostly sunny",
        4 => "Partly sunny",
        5 => "Mostly cloudy",
        6 => "Cloudy",
        7 => "Overcast",
        8 => "Overcast with low clouds",
        9 => "Fog",
        10 => "Light rain",
        11 => "Rain",
        12 => "Possible rain",
        13 => "Rain shower",
        14 => "Thunderstorm",
        15 => "Local thunderstorms",
        16 => "Light snow",
        17 => "Snow",
        18 => "Possible snow",
        19 => "Snow shower",
        20 | 22 => "Rain and snow",
        21 => "Possible rain and snow",
        23 => "Freezing rain",
        24 => "Possible freezing rain",
        25 => "Hail",
        26 => "Clear (night)",
        27 => "Mostly clear (night)",
        28 => "Partly clear (night)",
        29 => "Mostly cloudy (night)",
        30 => "Cloudy (night)",
        31 => "Overcast with low clouds (night)",
        32 => "Rain shower (night)",
        33 => "Local thunderstorms (night)",
        34 => "Snow shower (night)",
        35 => "Rain and snow (night)",
        36 => "Possible freezing rain (night)",
        _ => "Not available",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_cloudy_japanese() {
        assert_eq!(SummaryIcon::from_summary(Some("曇り")), SummaryIcon::Cloudy);
    }

    #[test]
    fn test_summary_first_match_wins() {
        // 晴 is checked before 曇
        assert_eq!(SummaryIcon::from_summary(Some("曇り時々晴れ")), SummaryIcon::Sunny);
        // 雨 is checked before 雷
        assert_eq!(SummaryIcon::from_summary(Some("雷雨")), SummaryIcon::Rain);
    }

    #[test]
    fn test_summary_storm_keywords() {
        assert_eq!(SummaryIcon::from_summary(Some("嵐")), SummaryIcon::Storm);
        assert_eq!(SummaryIcon::from_summary(Some("Thunder")), SummaryIcon::Storm);
    }

    #[test]
    fn test_summary_english_is_case_insensitive() {
        assert_eq!(SummaryIcon::from_summary(Some("Heavy RAIN")), SummaryIcon::Rain);
        assert_eq!(SummaryIcon::from_summary(Some("Snow showers")), SummaryIcon::Snow);
    }

    #[test]
    fn test_summary_defaults_to_sunny() {
        assert_eq!(SummaryIcon::from_summary(None), SummaryIcon::Sunny);
        assert_eq!(SummaryIcon::from_summary(Some("")), SummaryIcon::Sunny);
        assert_eq!(SummaryIcon::from_summary(Some("霧")), SummaryIcon::Sunny);
    }

    #[test]
    fn test_summary_codes_have_matching_labels() {
        assert_eq!(icon_label(SummaryIcon::Sunny.code()), "Sunny");
        assert_eq!(icon_label(SummaryIcon::Cloudy.code()), "Cloudy");
        assert_eq!(icon_label(SummaryIcon::Rain.code()), "Rain");
        assert_eq!(icon_label(SummaryIcon::Snow.code()), "Snow");
        assert_eq!(icon_label(SummaryIcon::Storm.code()), "Thunderstorm");
    }

    #[test]
    fn test_icon_label_unknown() {
        assert_eq!(icon_label(1), "Not available");
        assert_eq!(icon_label(99), "Not available");
        assert_eq!(icon_label(-3), "Not available");
    }

    #[test]
    fn test_coordinates_display_and_validity() {
        let tokyo = Coordinates::new(35.681236, 139.767125);
        assert_eq!(tokyo.to_string(), "35.6812, 139.7671");
        assert!(tokyo.is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
