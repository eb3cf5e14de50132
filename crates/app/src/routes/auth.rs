//! Auth route handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use shopify_embedded_core::ShopDomain;
use shopify_embedded_core::auth::routes;
use tracing::instrument;

use crate::auth::flow::authenticate_session;
use crate::auth::{AuthRejection, AuthRequest};
use crate::state::AppState;

/// Redirect a shop to its install/authorize page.
///
/// Missing or invalid shops go back to the login page.
#[instrument(skip_all, fields(shop = request.param("shop")))]
pub async fn login(State(state): State<AppState>, request: AuthRequest) -> impl IntoResponse {
    tracing::debug!("Handling /auth/login request");

    let Some(shop) = request.param("shop").and_then(|shop| ShopDomain::parse(shop).ok()) else {
        tracing::error!(
            redirect_path = routes::LOGIN,
            "Missing shop parameter, redirecting back to login"
        );
        return AuthRejection::redirect(routes::LOGIN);
    };

    let redirect_url = install_url(&shop, &state.config().shopify.api_key);
    tracing::info!(redirect_url, shop = %shop, "Redirecting login request");
    AuthRejection::redirect(redirect_url)
}

/// The shop's install/authorize URL for this app.
#[must_use]
pub fn install_url(shop: &ShopDomain, api_key: &str) -> String {
    let admin_path = shop
        .admin_path()
        .unwrap_or_else(|| format!("{shop}/admin"));
    format!("https://{admin_path}/oauth/install?client_id={api_key}")
}

/// Catch-all for `/auth/*` once the gate has let the request through.
///
/// Forces a token exchange for the shop, replacing whatever session was
/// stored.
///
/// # Errors
///
/// Redirects to login when the shop or token is missing, and fails when the
/// exchange, storage or webhook registration fails.
#[instrument(skip_all, fields(path = %request.path()))]
pub async fn callback(
    State(state): State<AppState>,
    request: AuthRequest,
) -> Result<StatusCode, AuthRejection> {
    tracing::debug!("Handling auth request");

    let Some(shop) = request.param("shop").and_then(|shop| ShopDomain::parse(shop).ok()) else {
        tracing::error!("Missing shop query param, redirecting to login");
        return Err(AuthRejection::redirect(routes::LOGIN));
    };

    let Some(session_token) = request.session_token() else {
        tracing::error!("Missing session token, redirecting to login");
        return Err(AuthRejection::redirect(routes::LOGIN));
    };

    authenticate_session(&state, &shop, session_token, None).await?;
    tracing::info!(shop = %shop, "Finished authenticating session");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_install_url_uses_unified_admin() {
        let shop = ShopDomain::parse("my-store.myshopify.com").unwrap();
        assert_eq!(
            install_url(&shop, "abc123"),
            "https://admin.shopify.com/store/my-store/oauth/install?client_id=abc123"
        );
    }

    #[test]
    fn test_install_url_falls_back_to_shop_admin() {
        let shop = ShopDomain::parse("my-store.shopify.com").unwrap();
        assert_eq!(
            install_url(&shop, "abc123"),
            "https://my-store.shopify.com/admin/oauth/install?client_id=abc123"
        );
    }
}
