use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Snapshot store is reachable", body = HealthResponse),
        (status = 503, description = "Snapshot store is unreachable", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Relay diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Connection, session and host statistics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Active viewers of a document
#[utoipa::path(
    get,
    path = "/api/v1/documents/{doc_id}/presence",
    params(
        ("doc_id" = String, Path, description = "Document identifier")
    ),
    responses(
        (status = 200, description = "Current presence count", body = PresenceResponse)
    )
)]
#[allow(dead_code)]
pub async fn document_presence_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        document_presence_doc,
    ),
    components(
        schemas(HealthResponse, ErrorResponse, DiagnosticsResponse, PresenceResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
