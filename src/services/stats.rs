//! Window statistics: rainfall total, average temperature, day count.

use crate::domain::{ForecastWindow, Statistics};

/// Summarize a forecast window. Pure and total.
///
/// `avg_temperature` only averages strictly positive temperatures and is
/// exactly 0 when none qualify.
pub fn summarize(window: &ForecastWindow) -> Statistics {
    if window.is_empty() {
        return Statistics {
            rain_sum: 0.0,
            avg_temperature: 0.0,
            day_count: 0,
        };
    }

    let rain_sum: f64 = window
        .days()
        .iter()
        .map(|d| d.details.rain_probability)
        .sum();

    let (temp_total, temp_count) = window
        .days()
        .iter()
        .map(|d| d.details.temperature)
        .filter(|t| *t > 0.0)
        .fold((0.0, 0usize), |(total, n), t| (total + t, n + 1));

    let avg_temperature = if temp_count == 0 {
        0.0
    } else {
        temp_total / temp_count as f64
    };

    Statistics {
        rain_sum,
        avg_temperature,
        day_count: window.len(),
    }
}
