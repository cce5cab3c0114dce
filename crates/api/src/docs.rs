//! API documentation publisher.
//!
//! Serves a static OpenAPI document and a viewer page. Mounted only outside
//! production; in production both paths fall through to the 404 fallback.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::AppConfig;

/// Router exposing `/api-docs` (viewer) and `/api-docs.json` (document).
pub fn router(config: &AppConfig) -> Router {
    let spec = openapi_spec(config);

    Router::new()
        .route("/api-docs", get(viewer))
        .route("/api-docs.json", get(move || async move { Json(spec) }))
}

async fn viewer() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

fn openapi_spec(config: &AppConfig) -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Venuity Admin API Documentation",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API documentation for the Venuity admin backend",
            "contact": {
                "name": "Venuity Support",
                "email": "support@venuity.com",
            },
        },
        "servers": [
            {
                "url": format!("http://localhost:{}", config.port),
                "description": format!("{} server", config.environment),
            },
        ],
        "components": {
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT",
                },
            },
        },
        "security": [{ "bearerAuth": [] }],
        "paths": {
            "/health": {
                "get": {
                    "summary": "Process liveness check",
                    "security": [],
                    "responses": {
                        "200": { "description": "Server is running" },
                    },
                },
            },
            "/api/": {
                "get": {
                    "summary": "Business API index",
                    "responses": {
                        "200": { "description": "API is running" },
                    },
                },
            },
        },
    })
}

const VIEWER_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Venuity Admin API Documentation</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({ url: "/api-docs.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"#;
