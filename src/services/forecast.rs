//! Forecast resolution service.
//!
//! Per request:
//!   1. Look the city up (unknown → `NotFound`, before any other I/O)
//!   2. Freshness: any stored row dated today or later means the stored
//!      window is reused as-is
//!   3. Miss: fetch from the provider, normalize, upsert every day
//!   4. Summarize the window
//!
//! Freshness is per calendar day and window-wide. A location with a single
//! stored row for today counts as fresh even though the window is short;
//! no top-up fetch is made.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::models::StoredForecastRow;
use crate::db::store::{CityRegistry, ForecastStore};
use crate::domain::{
    DailyForecast, ForecastDetails, ForecastWindow, Location, WeatherReport, FORECAST_WINDOW_DAYS,
};
use crate::errors::AppError;
use crate::services::meteo::ForecastProvider;
use crate::services::normalize::build_window;
use crate::services::stats::summarize;

/// Ties the city registry, the forecast store and the upstream provider
/// together. All three are injected; the service owns none of their lifecycles.
#[derive(Clone)]
pub struct ForecastService {
    registry: Arc<dyn CityRegistry>,
    store: Arc<dyn ForecastStore>,
    provider: Arc<dyn ForecastProvider>,
}

impl ForecastService {
    pub fn new(
        registry: Arc<dyn CityRegistry>,
        store: Arc<dyn ForecastStore>,
        provider: Arc<dyn ForecastProvider>,
    ) -> Self {
        Self {
            registry,
            store,
            provider,
        }
    }

    /// Whether any stored row for `location` is dated `today` or later.
    pub async fn is_fresh(&self, location: &Location, today: NaiveDate) -> Result<bool, AppError> {
        let rows = self.store.query_rows(location, today, 1).await?;
        Ok(!rows.is_empty())
    }

    /// Resolve the forecast window and statistics for a location.
    ///
    /// Either a complete report or a single typed error; upstream failures
    /// never fall back to stale rows.
    pub async fn resolve(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<WeatherReport, AppError> {
        let city = self
            .registry
            .lookup(location)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City {} not found", location)))?;

        let window = if self.is_fresh(location, today).await? {
            tracing::debug!("Forecast cache hit for {} ({})", location, today);
            self.load_stored_window(location, today).await?
        } else {
            tracing::info!("Forecast cache miss for {} ({}), fetching", location, today);
            self.refresh_window(location).await?
        };

        let statistics = summarize(&window);

        Ok(WeatherReport {
            city,
            window,
            statistics,
        })
    }

    /// Rebuild the window from stored rows. They were normalized before being
    /// written, so only the details blob needs decoding.
    async fn load_stored_window(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<ForecastWindow, AppError> {
        let rows = self
            .store
            .query_rows(location, today, FORECAST_WINDOW_DAYS)
            .await?;

        let days = rows
            .into_iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ForecastWindow::new(days))
    }

    async fn refresh_window(&self, location: &Location) -> Result<ForecastWindow, AppError> {
        let raw_days = self
            .provider
            .fetch_forecast(location, FORECAST_WINDOW_DAYS)
            .await
            .inspect_err(|e| tracing::warn!("Forecast fetch failed for {}: {}", location, e))?;

        let window = build_window(&raw_days, FORECAST_WINDOW_DAYS)?;

        let rows = window
            .days()
            .iter()
            .map(|day| encode_row(location, day))
            .collect::<Result<Vec<_>, _>>()?;
        self.store
            .upsert_rows(&rows)
            .await
            .inspect_err(|e| tracing::warn!("Forecast persist failed for {}: {}", location, e))?;
        tracing::info!("Stored {} forecast days for {}", window.len(), location);

        Ok(window)
    }
}

fn encode_row(location: &Location, day: &DailyForecast) -> Result<StoredForecastRow, AppError> {
    let details = serde_json::to_value(&day.details)
        .map_err(|e| AppError::StorageError(format!("Failed to encode forecast details: {}", e)))?;
    Ok(StoredForecastRow {
        insee: location.as_str().to_string(),
        date: day.date,
        details,
    })
}

fn decode_row(row: StoredForecastRow) -> Result<DailyForecast, AppError> {
    let details: ForecastDetails = serde_json::from_value(row.details).map_err(|e| {
        AppError::StorageError(format!(
            "Corrupt forecast details for {} on {}: {}",
            row.insee, row.date, e
        ))
    })?;
    Ok(DailyForecast {
        date: row.date,
        details,
    })
}
