//! Persistence contracts used by the forecast service, and their Postgres
//! implementation.
//!
//! Every call is bounded by a timeout; expiry is reported as `StorageError`
//! just like any sqlx failure. A batch write that times out is dropped with
//! its transaction, so it rolls back.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::models::StoredForecastRow;
use super::queries;
use crate::domain::{CityInfo, Location};
use crate::errors::AppError;

/// Stored forecast rows, keyed by `(location, date)`.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Rows for `location` dated on or after `min_date`, oldest first.
    async fn query_rows(
        &self,
        location: &Location,
        min_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<StoredForecastRow>, AppError>;

    /// Insert or overwrite each row by `(location, date)`, all or nothing.
    /// A failure leaves no row of the batch behind.
    async fn upsert_rows(&self, rows: &[StoredForecastRow]) -> Result<(), AppError>;
}

/// Read-only view of the city registry.
#[async_trait]
pub trait CityRegistry: Send + Sync {
    async fn lookup(&self, location: &Location) -> Result<Option<CityInfo>, AppError>;
}

/// Postgres-backed store and registry sharing one pool.
#[derive(Debug, Clone)]
pub struct PgForecastStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgForecastStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, AppError>
    where
        T: Send,
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                tracing::error!("{} timed out after {:?}", op, self.timeout);
                Err(AppError::StorageError(format!("{} timed out", op)))
            }
        }
    }
}

#[async_trait]
impl ForecastStore for PgForecastStore {
    async fn query_rows(
        &self,
        location: &Location,
        min_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<StoredForecastRow>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.bounded(
            "forecast query",
            queries::get_forecast_rows(&self.pool, location.as_str(), min_date, limit),
        )
        .await
    }

    async fn upsert_rows(&self, rows: &[StoredForecastRow]) -> Result<(), AppError> {
        self.bounded("forecast upsert", async {
            let mut tx = self.pool.begin().await?;
            for row in rows {
                queries::upsert_forecast_row(&mut *tx, row).await?;
            }
            tx.commit().await
        })
        .await
    }
}

#[async_trait]
impl CityRegistry for PgForecastStore {
    async fn lookup(&self, location: &Location) -> Result<Option<CityInfo>, AppError> {
        let city = self
            .bounded("city lookup", queries::get_city(&self.pool, location.as_str()))
            .await?;
        Ok(city.map(CityInfo::from))
    }
}
