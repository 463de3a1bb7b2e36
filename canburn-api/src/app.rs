//! HTTP dispatcher: query parsing, status-code mapping and JSON bodies.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use canburn_core::{
    Config, FireStatusResolver, FireWatchError, FireWatchResult, GeocodeResolver, GeocodeResult,
    ValidationError, provider::providers_from_config,
    validate::{parse_coordinates, validate_location},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

const SERVICE_NAME: &str = "can-i-burn-api";

/// Shared, immutable per-process state.
#[derive(Debug, Clone)]
pub struct AppState {
    fire: Arc<FireStatusResolver>,
    geocoder: Arc<GeocodeResolver>,
}

impl AppState {
    pub fn new(fire: FireStatusResolver, geocoder: GeocodeResolver) -> Self {
        Self { fire: Arc::new(fire), geocoder: Arc::new(geocoder) }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fire = FireStatusResolver::from_config(&config.fire_service)?;
        let geocoder = GeocodeResolver::new(providers_from_config(config)?);
        Ok(Self::new(fire, geocoder))
    }

    pub fn geocoder(&self) -> &GeocodeResolver {
        &self.geocoder
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/fire-watch", get(fire_watch))
        .route("/api/geocode", get(geocode))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON error body: `{"error": ..., "message": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<FireWatchError> for ApiError {
    fn from(err: FireWatchError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Request failed".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid query".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error, "message": self.message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
struct FireWatchQuery {
    lat: Option<String>,
    lng: Option<String>,
}

async fn fire_watch(
    State(state): State<AppState>,
    query: Result<Query<FireWatchQuery>, QueryRejection>,
) -> Result<Json<FireWatchResult>, ApiError> {
    let Query(query) = query?;
    let coords = parse_coordinates(query.lat.as_deref(), query.lng.as_deref())?;

    info!(latitude = coords.latitude, longitude = coords.longitude, "fire-watch request");

    let result = state.fire.resolve(coords).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct GeocodeQuery {
    location: Option<String>,
}

async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<GeocodeResult>, ApiError> {
    let Query(query) = query?;
    let location = validate_location(query.location.as_deref())?;

    info!(location = %location, "geocode request");

    Ok(Json(state.geocoder.resolve(&location).await))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        error: "Not found".to_string(),
        message: format!("Route {} not found", uri.path()),
    }
}
