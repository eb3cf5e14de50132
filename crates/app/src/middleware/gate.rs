//! The session gate.
//!
//! Every document route outside [`EXCLUDED_PATHS`] must resolve to a shop
//! session before its handler runs. The gate runs [`assert_session`] and
//! either stores the session in request extensions or answers the request
//! with whatever the auth flow decided (redirect, bootstrap page, 401).

use std::collections::BTreeMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shopify_embedded_core::Session;
use shopify_embedded_core::auth::routes;

use crate::auth::{AuthRequest, assert_session};
use crate::error::set_sentry_user;
use crate::state::AppState;

use super::extract::CurrentSession;

/// Path prefixes the gate lets through untouched.
///
/// `/api` routes authenticate themselves through the
/// [`ShopifySession`](super::ShopifySession) extractor.
pub const EXCLUDED_PATHS: &[&str] = &[
    "/api",
    routes::AUTH_LOGIN,
    routes::LOGIN,
    "/__error",
    "/health",
    "/static",
];

/// Returns true if `path` starts with an excluded prefix.
#[must_use]
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// Middleware asserting a shop session for every non-excluded request.
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_excluded(path) || path == state.config().shopify.webhook_path {
        tracing::debug!(path, "Excluded path, skipping session gate");
        return next.run(request).await;
    }

    let auth_request = AuthRequest::new(request.uri(), request.headers());
    match assert_session(&state, &auth_request).await {
        Ok(session) => {
            record_session(&session);
            request.extensions_mut().insert(CurrentSession(session));
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Attach the session to the Sentry scope. The access token is never sent.
pub(crate) fn record_session(session: &Session) {
    set_sentry_user(session.id.as_str(), session.shop.as_str());

    let mut context: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    context.insert("id".to_string(), session.id.as_str().into());
    context.insert("shop".to_string(), session.shop.as_str().into());
    context.insert("is_online".to_string(), session.is_online.into());
    if let Some(scope) = &session.scope {
        context.insert("scope".to_string(), scope.as_str().into());
    }
    if let Some(expires) = session.expires {
        context.insert("expires".to_string(), expires.to_rfc3339().into());
    }

    sentry::configure_scope(|scope| {
        scope.set_context("session", sentry::protocol::Context::Other(context));
    });
}
