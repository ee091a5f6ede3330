// Meteo Forecast API v0.1
use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod domain;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use db::store::PgForecastStore;
use routes::weather::AppState;
use services::forecast::ForecastService;
use services::meteo::MeteoConceptClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 1;

/// Meteo Forecast API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meteo Forecast API",
        version = "0.1.0",
        description = "City weather API. Serves a four-day forecast per INSEE code, \
            reusing today's stored forecast when there is one and otherwise fetching \
            from Météo-Concept, together with rainfall and temperature statistics.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "City forecast retrieval"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::get_city_weather,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::weather::WeatherResponse,
            domain::CityInfo,
            domain::DailyForecast,
            domain::ForecastDetails,
            domain::Statistics,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meteo_forecast_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // One pool for the whole process, handed to the store explicitly
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .acquire_timeout(config.storage_timeout)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let provider = MeteoConceptClient::new(
        &config.meteo_base_url,
        &config.meteo_api_token,
        config.upstream_timeout,
    )
    .expect("Failed to build forecast provider client");

    let store = Arc::new(PgForecastStore::new(pool.clone(), config.storage_timeout));
    let forecasts = ForecastService::new(store.clone(), store, Arc::new(provider));

    let app_state = AppState {
        forecasts: Arc::new(forecasts),
    };

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let weather_routes = Router::new()
        .route(
            "/api/v1/weather/:insee",
            get(routes::weather::get_city_weather),
        )
        .with_state(app_state);

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(weather_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
