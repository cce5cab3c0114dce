//! Cross-cutting request stages.
//!
//! Each stage either passes control forward or terminates the request with a
//! response of its own; none of them carry per-request state.

use axum::extract::{Request, State};
use axum::http::header::{
    HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERRER_POLICY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsPolicy;
use crate::errors::ApiError;

const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

/// Set hardening response headers on every response. Never halts.
///
/// Outermost stage of the pipeline so the headers are present on route
/// responses, fallback 404s, error responses, and panic-recovered 500s
/// alike.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("0"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        CROSS_ORIGIN_OPENER_POLICY,
        HeaderValue::from_static("same-origin"),
    );

    response
}

/// CORS response-header stage built from the configured policy.
///
/// Allowed methods and headers are fixed; credentials are honored only for
/// an explicit allow-list (a credentialed wildcard is not valid CORS, so the
/// allow-any policy is emitted without credentials).
pub fn cors(policy: &CorsPolicy) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    match policy {
        CorsPolicy::AllowAny => layer.allow_origin(AllowOrigin::any()),
        CorsPolicy::AllowList(origins) => layer
            .allow_origin(AllowOrigin::list(origins.iter().cloned()))
            .allow_credentials(true),
    }
}

/// Reject cross-origin requests whose `Origin` fails the policy before any
/// route handler runs.
///
/// `CorsLayer` only withholds response headers for disallowed origins; the
/// contract here is a hard client error, so this guard sits between the CORS
/// header stage and the routes. Requests without an `Origin` header
/// (same-origin, curl) pass through.
pub async fn enforce_origin(
    State(policy): State<CorsPolicy>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        if !policy.allows(origin) {
            return Err(ApiError::forbidden("origin is not allowed by CORS policy"));
        }
    }

    Ok(next.run(req).await)
}
