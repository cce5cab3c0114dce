//! Process-level endpoints that live outside the `/api` mount.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Liveness check: the process is up and serving connections.
///
/// Deliberately independent of downstream dependency health — a database
/// outage must not flip this endpoint. Readiness checking, if ever needed,
/// is a separate concern with different semantics.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "message": "Server is running",
        })),
    )
}
