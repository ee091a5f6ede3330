//! Météo-Concept forecast client.
//!
//! Fetches daily forecasts by INSEE code.
//! See: https://api.meteo-concept.com/documentation

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::Location;
use crate::errors::AppError;
use crate::services::normalize::RawDay;

/// Source of raw (not yet normalized) forecast days.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch up to `days` raw forecast days for `location`, in provider order.
    async fn fetch_forecast(&self, location: &Location, days: usize)
        -> Result<Vec<RawDay>, AppError>;
}

/// Client for the Météo-Concept API.
#[derive(Debug, Clone)]
pub struct MeteoConceptClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

// --- Météo-Concept JSON response types ---

/// Only the envelope is typed; entries stay loose until normalization.
#[derive(Debug, Deserialize)]
struct DailyForecastResponse {
    forecast: Vec<Value>,
}

impl MeteoConceptClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::UpstreamError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl ForecastProvider for MeteoConceptClient {
    async fn fetch_forecast(
        &self,
        location: &Location,
        days: usize,
    ) -> Result<Vec<RawDay>, AppError> {
        let url = format!("{}/forecast/daily", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str()), ("insee", location.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::UpstreamError("Forecast provider timed out".to_string())
                } else {
                    AppError::UpstreamError(format!("Forecast provider request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamError(format!(
                "Forecast provider returned HTTP {}",
                response.status()
            )));
        }

        let body: DailyForecastResponse = response.json().await.map_err(|e| {
            AppError::UpstreamError(format!("Forecast provider JSON parse error: {}", e))
        })?;

        tracing::debug!(
            "Forecast provider returned {} days for {}",
            body.forecast.len(),
            location
        );

        body.forecast
            .into_iter()
            .take(days)
            .map(|entry| match entry {
                Value::Object(map) => Ok(map),
                other => Err(AppError::UpstreamError(format!(
                    "Malformed payload: forecast entry is not an object: {}",
                    other
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> MeteoConceptClient {
        MeteoConceptClient::new(&server.uri(), "test-token", Duration::from_secs(2)).unwrap()
    }

    fn paris() -> Location {
        Location::parse("75101").unwrap()
    }

    fn sample_response(days: usize) -> Value {
        let forecast: Vec<Value> = (0..days)
            .map(|i| {
                serde_json::json!({
                    "insee": "75101",
                    "day": i,
                    "datetime": format!("2026-03-0{}T01:00:00+0100", i + 1),
                    "weather": 3,
                    "tmin": 2,
                    "tmax": 10,
                    "probarain": 10 * (i + 1),
                    "wind10m": 15,
                    "gust10m": 35,
                    "dirwind10m": 220
                })
            })
            .collect();
        serde_json::json!({
            "city": { "insee": "75101", "name": "Paris 1er Arrondissement", "cp": 75001 },
            "update": "2026-03-01T04:36:23+0100",
            "forecast": forecast
        })
    }

    #[tokio::test]
    async fn test_fetch_forecast_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .and(query_param("token", "test-token"))
            .and(query_param("insee", "75101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response(14)))
            .expect(1)
            .mount(&server)
            .await;

        let days = client(&server).fetch_forecast(&paris(), 4).await.unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0]["datetime"], "2026-03-01T01:00:00+0100");
        assert_eq!(days[3]["probarain"], 40);
    }

    #[tokio::test]
    async fn test_fetch_forecast_fewer_days_than_requested() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response(2)))
            .mount(&server)
            .await;

        let days = client(&server).fetch_forecast(&paris(), 4).await.unwrap();
        assert_eq!(days.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_forecast_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast/daily"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_forecast_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_missing_forecast_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"city": {}})),
            )
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_non_object_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"forecast": [42, {"datetime": "2026-03-01"}]})),
            )
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(ref msg) if msg.contains("Malformed")));
    }

    #[tokio::test]
    async fn test_fetch_forecast_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_response(4))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            MeteoConceptClient::new(&server.uri(), "test-token", Duration::from_millis(50))
                .unwrap();
        let err = client.fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_connection_refused() {
        let client = MeteoConceptClient::new(
            "http://127.0.0.1:9/api",
            "test-token",
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.fetch_forecast(&paris(), 4).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamError(_)));
    }
}
