//! Weather HTTP endpoint.
//!
//! - GET /api/v1/weather/:insee

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CityInfo, DailyForecast, Location, Statistics, WeatherReport};
use crate::errors::{AppError, ErrorResponse};
use crate::services::forecast::ForecastService;

/// Shared application state for weather endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) forecasts: Arc<ForecastService>,
}

/// City weather response: up to four days plus summary statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherResponse {
    pub city: CityInfo,
    /// Forecast days ordered by date, today first
    pub forecast: Vec<DailyForecast>,
    pub statistics: Statistics,
}

impl From<WeatherReport> for WeatherResponse {
    fn from(r: WeatherReport) -> Self {
        Self {
            city: r.city,
            forecast: r.window.days().to_vec(),
            statistics: r.statistics,
        }
    }
}

/// Get the forecast for a city.
///
/// Serves today's stored forecast when one exists; otherwise fetches a fresh
/// one from the provider and stores it.
#[utoipa::path(
    get,
    path = "/api/v1/weather/{insee}",
    tag = "Weather",
    params(
        ("insee" = String, Path, description = "INSEE code (5 or 6 digits)"),
    ),
    responses(
        (status = 200, description = "Forecast window and statistics", body = WeatherResponse),
        (status = 400, description = "Malformed INSEE code", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 502, description = "Forecast provider unavailable", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn get_city_weather(
    State(state): State<AppState>,
    Path(insee): Path<String>,
) -> Result<Json<WeatherResponse>, AppError> {
    let location = Location::parse(&insee)?;
    let today = Utc::now().date_naive();

    let report = state.forecasts.resolve(&location, today).await?;
    Ok(Json(WeatherResponse::from(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::forecast::testing::{
        daily_payload, FakeProvider, FakeRegistry, MemoryStore,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn app(provider: FakeProvider) -> Router {
        let state = AppState {
            forecasts: Arc::new(ForecastService::new(
                Arc::new(FakeRegistry::with_city("75101", "Paris")),
                Arc::new(MemoryStore::default()),
                Arc::new(provider),
            )),
        };
        Router::new()
            .route("/api/v1/weather/:insee", get(get_city_weather))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_get_city_weather_ok() {
        let today = Utc::now().date_naive();
        let (status, json) = call(
            app(FakeProvider::returning(daily_payload(today))),
            "/api/v1/weather/75101",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["city"]["name"], "Paris");
        assert_eq!(json["city"]["postalCode"], "75001");
        assert_eq!(json["forecast"].as_array().unwrap().len(), 4);
        assert_eq!(json["forecast"][0]["date"], today.to_string());
        assert_eq!(json["forecast"][0]["tmin"], 2.0);
        assert_eq!(json["statistics"]["rainSum"], 100.0);
        assert_eq!(json["statistics"]["avgTemperature"], 6.0);
        assert_eq!(json["statistics"]["dayCount"], 4);
    }

    #[tokio::test]
    async fn test_get_city_weather_unknown_city() {
        let (status, json) = call(
            app(FakeProvider::returning(vec![])),
            "/api/v1/weather/00000",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("00000"));
    }

    #[tokio::test]
    async fn test_get_city_weather_bad_code() {
        let (status, _) = call(app(FakeProvider::returning(vec![])), "/api/v1/weather/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_city_weather_upstream_down() {
        let (status, _) = call(app(FakeProvider::failing("timeout")), "/api/v1/weather/75101").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
