//! Mountable handler sets.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

pub mod system;

/// Business route registry.
///
/// The shell mounts whatever registry it is handed under `/api` without
/// inspecting it; this is the production set, currently just the placeholder
/// index while domain areas are filled in.
pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "API is running" }))
}
