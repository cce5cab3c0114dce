//! HTTP API shell: middleware pipeline, route mounting, and process lifecycle.
//!
//! Structure:
//! - `config.rs`: environment snapshot read once at startup
//! - `middleware.rs`: cross-cutting request stages (security headers, CORS)
//! - `app.rs`: ordered pipeline composition and mount points
//! - `routes/`: mountable handler sets (registry shim + health)
//! - `docs.rs`: OpenAPI publisher (non-production only)
//! - `errors.rs`: centralized error presentation and terminal handlers
//! - `lifecycle.rs`: startup sequencing, listener ownership, fault containment

pub mod app;
pub mod config;
pub mod docs;
pub mod errors;
pub mod extract;
pub mod lifecycle;
pub mod middleware;
pub mod routes;
