use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

/// Liveness of the forecast API and its Postgres forecast store.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the forecast store cannot be reached
    pub status: String,
    /// Crate version of the running build
    pub version: String,
    /// Whether the Postgres holding cities and cached forecasts answers
    pub database: bool,
}

/// Report whether weather lookups can be served.
///
/// Without the store every `/weather` call fails with a storage error, so the
/// endpoint answers "degraded" in that case. It still returns 200 because the
/// process itself is up.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Forecast API is running", body = HealthResponse),
    )
)]
pub async fn health_check(State(pool): State<PgPool>) -> Json<HealthResponse> {
    let store_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
        .is_ok();

    if !store_ok {
        tracing::warn!("Health check: forecast store unreachable");
    }

    Json(HealthResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: store_ok,
    })
}
