//! HTML page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use shopify_embedded_core::auth::{SESSION_TOKEN_HEADER, routes};
use tracing::instrument;

use crate::auth::{AuthRequest, pages::APP_BRIDGE_SCRIPT};
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// "Enter your shop" page.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub action: &'static str,
    /// Prefills the shop input.
    pub shop: String,
}

/// Embedded app shell, rendered inside the admin iframe.
#[derive(Template, WebTemplate)]
#[template(path = "app.html")]
pub struct AppTemplate {
    pub api_key: String,
    pub shop: String,
    pub script_src: &'static str,
    pub token_header: &'static str,
    pub login_path: &'static str,
}

/// Display the login page.
#[instrument(skip_all)]
pub async fn login(request: AuthRequest) -> impl IntoResponse {
    LoginTemplate {
        action: routes::AUTH_LOGIN,
        shop: request.param("shop").unwrap_or_default().to_string(),
    }
}

/// Display the app shell for the gated session's shop.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn home(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> impl IntoResponse {
    AppTemplate {
        api_key: state.config().shopify.api_key.clone(),
        shop: session.shop.into_inner(),
        script_src: APP_BRIDGE_SCRIPT,
        token_header: SESSION_TOKEN_HEADER,
        login_path: routes::LOGIN,
    }
}
