//! Ordered pipeline composition and mount points.

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::{docs, errors, middleware, routes};

/// Compose the full request pipeline around an externally supplied business
/// route registry, mounted under `/api` unmodified.
///
/// Stage order is load-bearing: security headers wrap every response,
/// panic-recovered 500s included; panic containment wraps every stage below
/// it; the CORS policy check runs before any route (static assets included);
/// and body decoding happens before handlers that consume parsed payloads.
pub fn build_app(config: &AppConfig, api_routes: Router) -> Router {
    let uploads = ServeDir::new(&config.upload_dir)
        .not_found_service(errors::not_found.into_service());

    let mut router = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads);

    if !config.environment.is_production() {
        router = router.merge(docs::router(config));
        tracing::info!(
            "API docs available at http://localhost:{}/api-docs",
            config.port
        );
    }

    let mut router = router
        .fallback(errors::not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    // Diagnostic request logging is a development-only stage.
    if config.environment.is_development() {
        router = router.layer(TraceLayer::new_for_http());
    }

    // First layer in the builder is outermost on the request path. Security
    // headers sit outside panic containment so the synthesized 500 also
    // carries them on the way out; catch-panic stays outside every other
    // stage it contains.
    router.layer(
        ServiceBuilder::new()
            .layer(axum_middleware::from_fn(middleware::security_headers))
            .layer(CatchPanicLayer::custom(errors::handle_panic))
            .layer(middleware::cors(&config.cors))
            .layer(axum_middleware::from_fn_with_state(
                config.cors.clone(),
                middleware::enforce_origin,
            ))
            .layer(TimeoutLayer::new(config.request_timeout)),
    )
}
