//! Forecast record definition.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary labels, coldest first.
pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

/// Lowest temperature the generator produces, in Celsius.
pub const MIN_TEMPERATURE_C: i32 = -20;

/// Highest temperature the generator produces, in Celsius.
pub const MAX_TEMPERATURE_C: i32 = 54;

/// A single synthetic weather data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    /// Calendar date, no time component.
    pub date: NaiveDate,

    /// Temperature in Celsius.
    pub temperature_c: i32,

    /// Human-readable label from [`SUMMARIES`].
    pub summary: String,
}

impl WeatherForecast {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: impl Into<String>) -> Self {
        Self {
            date,
            temperature_c,
            summary: summary.into(),
        }
    }
}
