//! Provider record normalization.
//!
//! The provider's daily endpoint reports `tmin`/`tmax` and `probarain`; its
//! next-hours endpoint reports a single `temp2m` and `rh2m`; older payloads
//! use yet other spellings. Each canonical field is resolved through a fixed
//! alias chain ending in 0, so a `DailyForecast` is always fully populated.
//!
//! The loose `RawDay` map never leaves this module.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::domain::{DailyForecast, ForecastDetails, ForecastWindow};
use crate::errors::AppError;
use crate::helpers::first_f64;

/// One day as returned by the provider, before normalization.
pub type RawDay = Map<String, Value>;

const TEMPERATURE: &[&str] = &["temp2m"];
const TMIN: &[&str] = &["tmin"];
const TMAX: &[&str] = &["tmax"];
const RAIN_PROBABILITY: &[&str] = &["probarain", "probrain"];
const HUMIDITY: &[&str] = &["rh2m", "humidity"];
const PRESSURE: &[&str] = &["pressure", "msl"];
const WIND_SPEED: &[&str] = &["wind10m", "windSpeed"];
const WIND_GUST: &[&str] = &["gust10m", "windGust"];
const WIND_DIRECTION: &[&str] = &["dirwind10m", "windDirection"];
const WEATHER_CODE: &[&str] = &["weather", "weatherCode"];
const TIMESTAMP: &[&str] = &["datetime", "date"];

/// Normalize a single provider record.
///
/// Numeric fields never fail. The only error is a record without a usable
/// timestamp, which cannot be keyed by date.
pub fn normalize(raw: &RawDay) -> Result<DailyForecast, AppError> {
    let date = extract_date(raw).ok_or_else(|| {
        AppError::UpstreamError("Malformed payload: forecast entry without a date".to_string())
    })?;

    let tmin = first_f64(raw, TMIN);
    let tmax = first_f64(raw, TMAX);

    let temperature = first_f64(raw, TEMPERATURE)
        .or_else(|| match (tmin, tmax) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            _ => None,
        })
        .unwrap_or(0.0);

    Ok(DailyForecast {
        date,
        details: ForecastDetails {
            temperature,
            tmin: tmin.unwrap_or(temperature),
            tmax: tmax.unwrap_or(temperature),
            humidity: first_f64(raw, HUMIDITY).unwrap_or(0.0),
            pressure: first_f64(raw, PRESSURE).unwrap_or(0.0),
            wind_speed: first_f64(raw, WIND_SPEED).unwrap_or(0.0),
            wind_gust: first_f64(raw, WIND_GUST).unwrap_or(0.0),
            wind_direction: first_f64(raw, WIND_DIRECTION).unwrap_or(0.0),
            weather_code: first_f64(raw, WEATHER_CODE)
                .map(|code| code.round() as i32)
                .unwrap_or(0),
            rain_probability: first_f64(raw, RAIN_PROBABILITY).unwrap_or(0.0),
        },
    })
}

/// Normalize provider records into at most `limit` distinct days, in
/// provider order.
///
/// The provider is assumed to be chronological; nothing is re-sorted and a
/// short payload gives a short window. A record whose date is already in the
/// window (e.g. a second intraday entry) is skipped, the first one wins.
pub fn build_window(raw_days: &[RawDay], limit: usize) -> Result<ForecastWindow, AppError> {
    let mut days: Vec<DailyForecast> = Vec::with_capacity(limit);
    for raw in raw_days {
        if days.len() >= limit {
            break;
        }
        let day = normalize(raw)?;
        if days.iter().any(|d| d.date == day.date) {
            continue;
        }
        days.push(day);
    }
    Ok(ForecastWindow::new(days))
}

/// Date portion of the provider timestamp ("2026-03-01T01:00:00+0100" → 2026-03-01).
fn extract_date(raw: &RawDay) -> Option<NaiveDate> {
    TIMESTAMP
        .iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_str))
        .find_map(|ts| {
            let day = ts.trim().get(..10)?;
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
        })
}
