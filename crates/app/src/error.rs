//! Unified error handling for the app.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Errors a handler or the auth flow can end a request with.
///
/// Server-side variants are reported to Sentry and answered with a generic
/// message; the rest echo their message to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// The session store failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A call to the Shopify Admin API failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Minting an offline access token failed.
    #[error("Token exchange failed - {0}")]
    TokenExchange(ShopifyError),

    /// Webhook registration failed in a way Shopify did not describe.
    #[error("Failed to register webhooks - {0}")]
    WebhookRegistration(ShopifyError),

    /// The caller could not be authenticated (bad webhook signature).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else that should not happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is answered with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Internal(_)
            | Self::TokenExchange(_)
            | Self::WebhookRegistration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Body sent to the caller. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::TokenExchange(_) => {
                "Internal server error".to_string()
            }
            Self::WebhookRegistration(_) => "Failed to register webhooks".to_string(),
            Self::Shopify(_) => "Shopify request failed".to_string(),
            Self::Unauthorized(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request failed"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, self.public_message()).into_response()
    }
}

/// Set the Sentry user context from an authenticated session.
pub fn set_sentry_user(session_id: &str, shop: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(session_id.to_string()),
            username: Some(shop.to_string()),
            ..Default::default()
        }));
    });
}
