//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Embedded app shell (gated)
//! GET  /login                  - "Enter your shop" page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check
//!
//! # Auth
//! GET  /auth/login             - Redirect to the shop's install page
//! GET  /auth/session-token     - Bounce page (answered by the gate)
//! GET  /auth/exit-iframe       - Exit-iframe page (answered by the gate)
//! ANY  /auth/{*rest}           - Force a token exchange (gated)
//!
//! # API (session asserted by the `ShopifySession` extractor)
//! GET  /api/products           - First products of the shop
//! POST /api/webhooks           - Webhook deliveries (HMAC verified)
//! ```

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;
pub mod webhooks;

use axum::{
    Router,
    routing::{any, get, post},
};
use shopify_embedded_core::auth::routes as paths;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/{*rest}", any(auth::callback))
}

/// Create the API routes router.
///
/// The webhook path is configurable, so it is mounted as given rather than
/// under `/api`.
pub fn api_routes(webhook_path: &str) -> Router<AppState> {
    Router::new()
        .route("/api/products", get(api::products))
        .route(webhook_path, post(webhooks::receive))
}

/// Create all routes for the app.
pub fn routes(webhook_path: &str) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route(paths::LOGIN, get(pages::login))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(paths::AUTH, auth_routes())
        .merge(api_routes(webhook_path))
}
