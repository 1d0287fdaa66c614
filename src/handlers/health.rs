use std::sync::Arc;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::{debug, error};

use crate::models::{ErrorResponse, HealthResponse};
use crate::AppState;

/// Root banner kept for clients that check `/`
pub async fn root() -> &'static str {
    "WebSocket Server is Running"
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint, fails while the snapshot store is unreachable
pub async fn ready_check(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Readiness check requested");
    if let Err(e) = app_state.lifecycle.store().ping().await {
        error!("Snapshot store is not reachable: {}", e);
        let status = StatusCode::SERVICE_UNAVAILABLE;
        return Err((status, Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: e.to_string(),
        })));
    }
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
        timestamp: Utc::now(),
    }))
}
