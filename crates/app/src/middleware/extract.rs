//! Session extractors.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use shopify_embedded_core::Session;

use crate::auth::{AuthRejection, AuthRequest, assert_session};
use crate::error::AppError;
use crate::state::AppState;

use super::gate::record_session;

/// Session the gate asserted for this request.
///
/// Only available on gated routes; anywhere else extraction fails with a
/// 500, since it means the route was mounted outside the gate.
///
/// # Example
///
/// ```rust,ignore
/// async fn home(CurrentSession(session): CurrentSession) -> impl IntoResponse {
///     format!("Hello, {}!", session.shop)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Internal("route is not behind the session gate".to_string()))
    }
}

/// Extractor that asserts a shop session for `/api` routes.
///
/// API calls carry the session token header, so this normally resolves to a
/// stored session or answers 401 with the retry header.
#[derive(Debug, Clone)]
pub struct ShopifySession(pub Session);

impl FromRequestParts<AppState> for ShopifySession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request = AuthRequest::new(&parts.uri, &parts.headers);
        let session = assert_session(state, &request).await?;
        record_session(&session);
        Ok(Self(session))
    }
}
