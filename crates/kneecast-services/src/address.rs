use chrono::{DateTime, Utc};
use kneecast_weather::Coordinates;
use serde::{Deserialize, Serialize};

/// An address the user saved for quick forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: i64,
    pub name: String,
    pub coordinates: Coordinates,
    pub is_selected: bool,
    pub created_at: DateTime<Utc>,
}
