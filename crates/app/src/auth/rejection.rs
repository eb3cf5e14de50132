//! Terminal outcomes of the auth flow.

use axum::{
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use shopify_embedded_core::auth::RETRY_INVALID_SESSION_HEADER;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::shopify::ShopifyError;

use super::pages::AppBridgePage;

/// A response that ends the request before it reaches a handler.
///
/// Every step of the flow returns `Result<_, AuthRejection>`, so `?` stops at
/// the first step that has something to say.
#[derive(Debug)]
pub enum AuthRejection {
    /// `302 Found` to the given location.
    Redirect(String),
    /// The App Bridge bootstrap page (bounce or exit-iframe).
    AppBridge(AppBridgePage),
    /// The session token was rejected; App Bridge should fetch a new one and retry.
    InvalidSessionToken,
    /// Storage or Shopify failure.
    Error(AppError),
}

impl AuthRejection {
    /// Redirect to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(location) => match HeaderValue::try_from(location) {
                Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
                Err(_) => AppError::Internal("redirect location is not a valid header".to_string())
                    .into_response(),
            },
            Self::AppBridge(page) => page.into_response(),
            Self::InvalidSessionToken => (
                StatusCode::UNAUTHORIZED,
                [(RETRY_INVALID_SESSION_HEADER, "1")],
                "Unauthorized",
            )
                .into_response(),
            Self::Error(error) => error.into_response(),
        }
    }
}

impl From<AppError> for AuthRejection {
    fn from(error: AppError) -> Self {
        Self::Error(error)
    }
}

impl From<RepositoryError> for AuthRejection {
    fn from(error: RepositoryError) -> Self {
        Self::Error(AppError::Database(error))
    }
}

impl From<ShopifyError> for AuthRejection {
    fn from(error: ShopifyError) -> Self {
        Self::Error(AppError::Shopify(error))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_response() {
        let response = AuthRejection::redirect("/login").into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }

    #[test]
    fn test_invalid_session_token_response() {
        let response = AuthRejection::InvalidSessionToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(RETRY_INVALID_SESSION_HEADER)
                .unwrap(),
            "1"
        );
    }

    #[test]
    fn test_errors_keep_their_status() {
        let response = AuthRejection::from(ShopifyError::RateLimited(1)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
