use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use super::models::{City, StoredForecastRow};

/// Get a city by INSEE code.
pub async fn get_city(pool: &PgPool, insee: &str) -> Result<Option<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(
        "SELECT insee, name, postal_code, population FROM cities WHERE insee = $1",
    )
    .bind(insee)
    .fetch_optional(pool)
    .await
}

/// Get stored forecast days for a city dated on or after `min_date`,
/// ordered by date, at most `limit` rows.
pub async fn get_forecast_rows(
    pool: &PgPool,
    insee: &str,
    min_date: NaiveDate,
    limit: i64,
) -> Result<Vec<StoredForecastRow>, sqlx::Error> {
    sqlx::query_as::<_, StoredForecastRow>(
        "SELECT insee, date, details
         FROM forecasts
         WHERE insee = $1 AND date >= $2
         ORDER BY date ASC
         LIMIT $3",
    )
    .bind(insee)
    .bind(min_date)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Insert a forecast day, or overwrite the existing row for the same
/// `(insee, date)`. Runs on a pool or inside a transaction.
pub async fn upsert_forecast_row<'e, E>(
    executor: E,
    row: &StoredForecastRow,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO forecasts (insee, date, details, updated_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (insee, date) DO UPDATE SET
             details = EXCLUDED.details,
             updated_at = NOW()",
    )
    .bind(&row.insee)
    .bind(row.date)
    .bind(&row.details)
    .execute(executor)
    .await?;
    Ok(())
}
