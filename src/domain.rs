//! Core weather types shared by the normalizer, the store and the routes.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// Maximum number of days in a forecast window (today + 3).
pub const FORECAST_WINDOW_DAYS: usize = 4;

/// A city identified by its INSEE code (5 or 6 digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    pub fn parse(code: &str) -> Result<Self, AppError> {
        let valid = (5..=6).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid location code '{}': expected 5 or 6 digits",
                code
            )));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// City record as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityInfo {
    /// INSEE code
    pub insee: String,
    /// Display name (e.g. "Paris")
    pub name: String,
    /// Postal code
    pub postal_code: String,
    pub population: i32,
}

/// Every non-key field of a forecast day.
///
/// Serialized as-is into the stored details blob. Missing fields decode as 0
/// so blobs written by older builds still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastDetails {
    /// Representative temperature in °C
    pub temperature: f64,
    /// Minimum temperature in °C
    pub tmin: f64,
    /// Maximum temperature in °C
    pub tmax: f64,
    /// Relative humidity in %
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    /// Wind direction in degrees
    pub wind_direction: f64,
    /// Provider weather classification code
    pub weather_code: i32,
    /// Probability of rain in % (0-100, not enforced)
    pub rain_probability: f64,
}

/// One normalized forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyForecast {
    /// Calendar date (no time component)
    pub date: NaiveDate,
    #[serde(flatten)]
    pub details: ForecastDetails,
}

/// Ordered forecast days for one location, at most `FORECAST_WINDOW_DAYS`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastWindow(Vec<DailyForecast>);

impl ForecastWindow {
    /// Wrap already-ordered days, keeping at most `FORECAST_WINDOW_DAYS`.
    pub fn new(mut days: Vec<DailyForecast>) -> Self {
        days.truncate(FORECAST_WINDOW_DAYS);
        Self(days)
    }

    pub fn days(&self) -> &[DailyForecast] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Summary statistics derived from a window. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Sum of rain probabilities over the window
    pub rain_sum: f64,
    /// Mean of the strictly positive temperatures, 0 if there are none
    pub avg_temperature: f64,
    /// Number of days in the window
    pub day_count: usize,
}

/// Everything a caller gets back for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: CityInfo,
    pub window: ForecastWindow,
    pub statistics: Statistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_accepts_five_and_six_digits() {
        assert_eq!(Location::parse("75101").unwrap().as_str(), "75101");
        assert_eq!(Location::parse("975101").unwrap().as_str(), "975101");
    }

    #[test]
    fn test_location_rejects_bad_codes() {
        for code in ["", "7510", "1234567", "75a01", "2A004", " 75101"] {
            assert!(
                matches!(Location::parse(code), Err(AppError::BadRequest(_))),
                "expected rejection for {:?}",
                code
            );
        }
    }

    #[test]
    fn test_window_truncates_to_four_days() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let days: Vec<DailyForecast> = (0..6)
            .map(|i| DailyForecast {
                date: start + chrono::Duration::days(i),
                details: ForecastDetails::default(),
            })
            .collect();
        let window = ForecastWindow::new(days);
        assert_eq!(window.len(), FORECAST_WINDOW_DAYS);
        assert_eq!(window.days()[3].date, start + chrono::Duration::days(3));
    }

    #[test]
    fn test_daily_forecast_serializes_flat_camel_case() {
        let day = DailyForecast {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            details: ForecastDetails {
                wind_speed: 12.0,
                weather_code: 3,
                rain_probability: 40.0,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2026-03-01");
        assert_eq!(json["windSpeed"], 12.0);
        assert_eq!(json["weatherCode"], 3);
        assert_eq!(json["rainProbability"], 40.0);
    }

    #[test]
    fn test_details_decode_defaults_missing_fields() {
        let details: ForecastDetails =
            serde_json::from_value(serde_json::json!({"temperature": 7.5})).unwrap();
        assert_eq!(details.temperature, 7.5);
        assert_eq!(details.humidity, 0.0);
        assert_eq!(details.weather_code, 0);
    }
}
