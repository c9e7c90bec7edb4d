//! Health check handlers.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::SharedState;

/// Create health routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "",
    context_path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check including a database round-trip
#[utoipa::path(
    get,
    path = "/ready",
    context_path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Backing store unreachable")
    )
)]
pub async fn ready(State(state): State<SharedState>) -> Result<Json<HealthResponse>, StatusCode> {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok(Json(HealthResponse {
            status: "ready",
            version: env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
