//! Session assertion for embedded app requests.
//!
//! [`assert_session`] walks a request through every check an embedded app
//! load has to pass, and either returns the shop's session or an
//! [`AuthRejection`] describing where the browser should go next.
//!
//! Document loads (no session token header) must carry valid `shop` and
//! `host` parameters, must be embedded in the admin, and must carry an
//! `id_token` parameter; each missing piece is a redirect. Once a token is
//! available it is verified and the shop's offline session is loaded, and
//! minted through token exchange if it is missing or no longer usable.

use chrono::Utc;
use shopify_embedded_core::auth::{EXIT_IFRAME_PARAM, RELOAD_PARAM, SESSION_TOKEN_PARAM, routes};
use shopify_embedded_core::{Host, Session, SessionId, ShopDomain};
use tracing::instrument;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::shopify::SessionTokenClaims;
use crate::state::AppState;

use super::pages::AppBridgePage;
use super::rejection::AuthRejection;
use super::request::{AuthRequest, encode_query};

/// What a verified session token tells us about the request.
#[derive(Debug, Clone)]
pub struct SessionTokenContext {
    /// Shop the token was issued for.
    pub shop: ShopDomain,
    /// Id of the shop's offline session.
    pub session_id: SessionId,
    /// The raw token, needed for token exchange.
    pub session_token: String,
    /// Verified claims.
    pub payload: SessionTokenClaims,
}

/// Authenticate a request, returning the shop's session.
///
/// # Errors
///
/// Returns the first terminal outcome reached: a bootstrap page, a redirect,
/// a 401 for a rejected session token, or a storage/Shopify failure.
#[instrument(skip_all, fields(path = %request.path()))]
pub async fn assert_session(
    state: &AppState,
    request: &AuthRequest,
) -> Result<Session, AuthRejection> {
    tracing::debug!("Running redirect request handlers");
    respond_to_bounce_page_request(state.config(), request)?;
    respond_to_exit_iframe_request(state.config(), request)?;

    // No header means a document request: make sure we are embedded and have
    // what we need to load the session
    if request.session_token_header().is_none() {
        tracing::debug!("No session token header, running embedded checks");
        let (_shop, host) = validate_shop_and_host(request)?;
        ensure_app_is_embedded(state.config(), request, &host)?;
        ensure_session_token_param(state.config(), request)?;
    }

    let context = get_session_token_context(state, request)?;

    tracing::debug!(
        shop = %context.shop,
        session_id = %context.session_id,
        "Loading session from storage"
    );
    let existing = state.sessions().load(&context.session_id).await?;

    let session =
        authenticate_session(state, &context.shop, &context.session_token, existing).await?;

    tracing::debug!(shop = %session.shop, "Request is valid, loaded session from session token");
    Ok(session)
}

/// Render the bounce page for `/auth/session-token`.
///
/// App Bridge loads, fetches a fresh session token and reloads the URL in
/// `shopify-reload` with it.
///
/// # Errors
///
/// Returns the rendered page as a rejection when the path matches.
pub fn respond_to_bounce_page_request(
    config: &AppConfig,
    request: &AuthRequest,
) -> Result<(), AuthRejection> {
    if request.path() != routes::PATCH_SESSION_TOKEN {
        return Ok(());
    }

    tracing::debug!("Rendering bounce page");
    let shop = sanitized_shop(request);
    Err(AuthRejection::AppBridge(AppBridgePage::render(
        config,
        shop.as_ref(),
        None,
    )?))
}

/// Render the exit-iframe page for `/auth/exit-iframe`.
///
/// The page navigates the top frame to the `exitIframe` destination. Missing
/// or foreign destinations send the browser to the login page instead.
///
/// # Errors
///
/// Returns the rendered page (or login redirect) as a rejection when the
/// path matches.
pub fn respond_to_exit_iframe_request(
    config: &AppConfig,
    request: &AuthRequest,
) -> Result<(), AuthRejection> {
    if request.path() != routes::EXIT_IFRAME {
        return Ok(());
    }

    let shop = sanitized_shop(request);
    let Some(destination) = request
        .param(EXIT_IFRAME_PARAM)
        .filter(|destination| is_allowed_destination(config, shop.as_ref(), destination))
    else {
        tracing::warn!(
            destination = request.param(EXIT_IFRAME_PARAM),
            "Refusing exit-iframe destination, redirecting to login"
        );
        return Err(AuthRejection::redirect(routes::LOGIN));
    };

    tracing::debug!(destination, "Rendering exit iframe page");
    Err(AuthRejection::AppBridge(AppBridgePage::render(
        config,
        shop.as_ref(),
        Some(destination),
    )?))
}

/// Require valid `shop` and `host` parameters.
///
/// # Errors
///
/// Redirects to the login page if either is missing or fails sanitization.
pub fn validate_shop_and_host(request: &AuthRequest) -> Result<(ShopDomain, Host), AuthRejection> {
    let Some(shop) = sanitized_shop(request) else {
        tracing::error!(
            shop = request.param("shop"),
            "Missing or invalid shop, redirecting to login path"
        );
        return Err(AuthRejection::redirect(routes::LOGIN));
    };

    let Some(host) = request.param("host").and_then(|host| Host::parse(host).ok()) else {
        tracing::error!(
            shop = %shop,
            host = request.param("host"),
            "Missing or invalid host, redirecting to login path"
        );
        return Err(AuthRejection::redirect(routes::LOGIN));
    };

    Ok((shop, host))
}

/// Require the app to be loaded inside the Shopify admin.
///
/// # Errors
///
/// Redirects to the app's URL inside the admin when `embedded` is not `1`.
pub fn ensure_app_is_embedded(
    config: &AppConfig,
    request: &AuthRequest,
    host: &Host,
) -> Result<(), AuthRejection> {
    if request.is_embedded() {
        return Ok(());
    }

    let redirect_url = host.embedded_app_url(&config.shopify.api_key);
    tracing::debug!(redirect_url, "App is not embedded, redirecting to Shopify");
    Err(AuthRejection::redirect(redirect_url))
}

/// Require an `id_token` parameter on embedded document loads.
///
/// # Errors
///
/// Redirects to the bounce page when an embedded load has no token.
pub fn ensure_session_token_param(
    config: &AppConfig,
    request: &AuthRequest,
) -> Result<(), AuthRejection> {
    if request.is_embedded() && request.param(SESSION_TOKEN_PARAM).is_none() {
        tracing::debug!("Missing session token in search params, going to bounce page");
        return Err(redirect_to_bounce_page(config, request));
    }
    Ok(())
}

/// Build the redirect to the bounce page.
///
/// The current URL, minus its `id_token`, is carried in `shopify-reload` so
/// the bounce page can come back with a fresh token. The reload URL is built
/// from the configured app URL so it stays correct behind proxies that
/// rewrite the `Host` header.
#[must_use]
pub fn redirect_to_bounce_page(config: &AppConfig, request: &AuthRequest) -> AuthRejection {
    let mut params: Vec<(String, String)> = request
        .query()
        .iter()
        .filter(|(key, _)| key != SESSION_TOKEN_PARAM)
        .cloned()
        .collect();

    let reload = format!(
        "{}{}?{}",
        config.app_url,
        request.path(),
        encode_query(&params)
    );
    set_param(&mut params, RELOAD_PARAM, reload);

    let redirect_path = format!("{}?{}", routes::PATCH_SESSION_TOKEN, encode_query(&params));
    tracing::debug!(redirect_path, "Redirecting to bounce page");
    AuthRejection::redirect(redirect_path)
}

/// Resolve and verify the request's session token.
///
/// # Errors
///
/// Redirects to the bounce page when there is no token, and answers an
/// invalid token through [`respond_to_invalid_session_token`].
pub fn get_session_token_context(
    state: &AppState,
    request: &AuthRequest,
) -> Result<SessionTokenContext, AuthRejection> {
    let Some(session_token) = request.session_token() else {
        tracing::error!("No session token found, redirecting to bounce page");
        return Err(redirect_to_bounce_page(state.config(), request));
    };

    tracing::debug!("Attempting to authenticate session token");
    let payload = state
        .shopify()
        .decode_session_token(session_token)
        .and_then(|payload| payload.shop().map(|shop| (payload, shop)));

    let (payload, shop) = match payload {
        Ok(verified) => verified,
        Err(error) => {
            tracing::debug!(%error, "Failed to validate session token");
            return Err(respond_to_invalid_session_token(state.config(), request));
        }
    };

    let session_id = SessionId::offline(&shop);
    tracing::debug!(shop = %shop, session_id = %session_id, "Session token is valid");

    Ok(SessionTokenContext {
        shop,
        session_id,
        session_token: session_token.to_owned(),
        payload,
    })
}

/// Answer a request whose session token was rejected.
///
/// Document loads go back through the bounce page for a fresh token. Requests
/// that sent the token header get a 401 asking App Bridge to retry.
#[must_use]
pub fn respond_to_invalid_session_token(config: &AppConfig, request: &AuthRequest) -> AuthRejection {
    if request.session_token_header().is_none() {
        tracing::debug!("Document request, redirecting to bounce page");
        return redirect_to_bounce_page(config, request);
    }

    tracing::debug!("Retry request, setting shopify retry header");
    AuthRejection::InvalidSessionToken
}

/// Return `existing` if it is still usable, otherwise mint a new offline
/// session through token exchange.
///
/// A new session is stored before webhooks are registered. Webhook failures
/// Shopify reported are logged and the session is still returned; any other
/// failure fails the request.
///
/// # Errors
///
/// Returns an error if token exchange or storage fails, or if webhook
/// registration fails in an unrecognized way.
#[instrument(skip_all, fields(shop = %shop))]
pub async fn authenticate_session(
    state: &AppState,
    shop: &ShopDomain,
    session_token: &str,
    existing: Option<Session>,
) -> Result<Session, AuthRejection> {
    let required_scopes = state.config().shopify.required_scopes();
    if let Some(session) = existing
        && session.is_active(Utc::now(), required_scopes)
    {
        tracing::debug!("Session is active, returning session");
        return Ok(session);
    }

    tracing::info!("No valid session found, requesting offline access token");
    let session = state
        .shopify()
        .token_exchange(shop, session_token)
        .await
        .map_err(AppError::TokenExchange)?;

    tracing::debug!("Storing session");
    state.sessions().store(&session).await?;

    tracing::debug!("Registering webhooks");
    if let Err(error) = state.shopify().register_webhooks(&session).await {
        if !error.is_recognized() {
            return Err(AppError::WebhookRegistration(error).into());
        }

        let event_id = sentry::capture_error(&error);
        tracing::error!(
            error = %error,
            sentry_event_id = %event_id,
            "Failed to register webhooks"
        );
    }

    tracing::debug!("Finished authenticating session, returning new offline session");
    Ok(session)
}

fn sanitized_shop(request: &AuthRequest) -> Option<ShopDomain> {
    request
        .param("shop")
        .and_then(|shop| ShopDomain::parse(shop).ok())
}

/// Replace the first `name` pair in place (dropping any others), or append it.
fn set_param(params: &mut Vec<(String, String)>, name: &str, value: String) {
    let mut value = Some(value);
    params.retain_mut(|(key, existing)| {
        if key != name {
            return true;
        }
        value.take().is_some_and(|value| {
            *existing = value;
            true
        })
    });
    if let Some(value) = value {
        params.push((name.to_owned(), value));
    }
}

/// Exit-iframe destinations are limited to app-relative paths, the app
/// itself, the shop and the Shopify admin.
fn is_allowed_destination(config: &AppConfig, shop: Option<&ShopDomain>, destination: &str) -> bool {
    if destination.starts_with('/') {
        return !destination.starts_with("//") && !destination.starts_with("/\\");
    }

    let Ok(url) = url::Url::parse(destination) else {
        return false;
    };

    let origin = url.origin().ascii_serialization();
    if url::Url::parse(&config.app_url).is_ok_and(|app| app.origin().ascii_serialization() == origin)
    {
        return true;
    }

    url.scheme() == "https"
        && url.host_str().is_some_and(|host| {
            host == "admin.shopify.com" || shop.is_some_and(|shop| host == shop.as_str())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::HeaderMap;
    use secrecy::SecretString;
    use shopify_embedded_core::AuthScopes;

    use super::*;
    use crate::config::ShopifyConfig;
    use crate::db::{MemorySessionStore, SessionStore};
    use crate::shopify::{ShopifyAdmin, ShopifyError, session_token};

    fn config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/app"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            app_url: "https://my-app.example.dev".to_string(),
            shopify: ShopifyConfig {
                api_key: "abc123".to_string(),
                api_secret: SecretString::from("f3b1c9e2a7d84c05b6e19a2f0d7c3b58"),
                api_version: "2024-04".to_string(),
                scopes: AuthScopes::default(),
                webhook_path: "/api/webhooks".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            json_logs: false,
        }
    }

    fn request(uri: &str) -> AuthRequest {
        AuthRequest::new(&uri.parse().unwrap(), &HeaderMap::new())
    }

    fn request_with_header(uri: &str) -> AuthRequest {
        let mut headers = HeaderMap::new();
        headers.insert(
            shopify_embedded_core::auth::SESSION_TOKEN_HEADER,
            "token".parse().unwrap(),
        );
        AuthRequest::new(&uri.parse().unwrap(), &headers)
    }

    fn request_with_token_header(token: &str) -> AuthRequest {
        let mut headers = HeaderMap::new();
        headers.insert(
            shopify_embedded_core::auth::SESSION_TOKEN_HEADER,
            token.parse().unwrap(),
        );
        AuthRequest::new(&"/api/products".parse().unwrap(), &headers)
    }

    fn location(rejection: AuthRejection) -> String {
        match rejection {
            AuthRejection::Redirect(location) => location,
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    // admin.shopify.com/store/my-store
    const HOST: &str = "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvbXktc3RvcmU";

    #[test]
    fn test_missing_shop_redirects_to_login() {
        let err = validate_shop_and_host(&request("/")).unwrap_err();
        assert_eq!(location(err), "/login");
    }

    #[test]
    fn test_invalid_host_redirects_to_login() {
        let err =
            validate_shop_and_host(&request("/?shop=my-store.myshopify.com&host=%21%21")).unwrap_err();
        assert_eq!(location(err), "/login");
    }

    #[test]
    fn test_valid_shop_and_host() {
        let (shop, host) = validate_shop_and_host(&request(&format!(
            "/?shop=my-store.myshopify.com&host={HOST}"
        )))
        .unwrap();
        assert_eq!(shop.as_str(), "my-store.myshopify.com");
        assert_eq!(host.decoded(), "admin.shopify.com/store/my-store");
    }

    #[test]
    fn test_not_embedded_redirects_into_admin() {
        let req = request(&format!("/?shop=my-store.myshopify.com&host={HOST}"));
        let (_, host) = validate_shop_and_host(&req).unwrap();

        let err = ensure_app_is_embedded(&config(), &req, &host).unwrap_err();
        assert_eq!(
            location(err),
            "https://admin.shopify.com/store/my-store/apps/abc123"
        );
    }

    #[test]
    fn test_embedded_without_token_goes_to_bounce_page() {
        let req = request(&format!(
            "/products?shop=my-store.myshopify.com&host={HOST}&embedded=1"
        ));
        let err = ensure_session_token_param(&config(), &req).unwrap_err();

        let expected_reload = format!(
            "https://my-app.example.dev/products?shop=my-store.myshopify.com&host={HOST}&embedded=1"
        );
        let expected = format!(
            "/auth/session-token?shop=my-store.myshopify.com&host={HOST}&embedded=1&shopify-reload={}",
            encode_query(&[("x".to_string(), expected_reload)])
                .trim_start_matches("x=")
        );
        assert_eq!(location(err), expected);
    }

    #[test]
    fn test_bounce_redirect_drops_id_token() {
        let req = request("/?id_token=abc&shop=my-store.myshopify.com");
        let target = location(redirect_to_bounce_page(&config(), &req));

        assert!(target.starts_with("/auth/session-token?shop=my-store.myshopify.com&shopify-reload="));
        assert!(!target.contains("id_token"));
    }

    #[test]
    fn test_bounce_redirect_replaces_existing_reload() {
        let req = request("/?shopify-reload=old&shop=my-store.myshopify.com");
        let target = location(redirect_to_bounce_page(&config(), &req));

        assert_eq!(target.matches("shopify-reload=").count(), 1);
        assert!(target.starts_with("/auth/session-token?shopify-reload="));
    }

    #[test]
    fn test_invalid_token_with_header_is_401() {
        let req = request_with_header("/api/products");
        assert!(matches!(
            respond_to_invalid_session_token(&config(), &req),
            AuthRejection::InvalidSessionToken
        ));
    }

    #[test]
    fn test_invalid_token_without_header_bounces() {
        let req = request("/?id_token=bad");
        let target = location(respond_to_invalid_session_token(&config(), &req));
        assert!(target.starts_with("/auth/session-token?"));
    }

    #[test]
    fn test_bounce_page_request_renders_page() {
        let req = request("/auth/session-token?shop=my-store.myshopify.com");
        assert!(matches!(
            respond_to_bounce_page_request(&config(), &req),
            Err(AuthRejection::AppBridge(_))
        ));
        assert!(respond_to_bounce_page_request(&config(), &request("/")).is_ok());
    }

    #[test]
    fn test_exit_iframe_destinations() {
        let config = config();
        let shop = ShopDomain::parse("my-store.myshopify.com").unwrap();

        assert!(is_allowed_destination(&config, None, "/settings"));
        assert!(is_allowed_destination(&config, None, "https://my-app.example.dev/x"));
        assert!(is_allowed_destination(
            &config,
            None,
            "https://admin.shopify.com/store/my-store/apps/abc123"
        ));
        assert!(is_allowed_destination(
            &config,
            Some(&shop),
            "https://my-store.myshopify.com/admin/oauth/install?client_id=abc123"
        ));

        assert!(!is_allowed_destination(&config, None, "//evil.example.com"));
        assert!(!is_allowed_destination(&config, None, "https://evil.example.com"));
        assert!(!is_allowed_destination(&config, None, "javascript:alert(1)"));
        assert!(!is_allowed_destination(
            &config,
            None,
            "https://my-store.myshopify.com/admin"
        ));
    }

    #[test]
    fn test_exit_iframe_without_destination_goes_to_login() {
        let req = request("/auth/exit-iframe?shop=my-store.myshopify.com");
        let err = respond_to_exit_iframe_request(&config(), &req).unwrap_err();
        assert_eq!(location(err), "/login");
    }

    /// Shopify fake: real token verification, counted exchanges, scripted
    /// webhook outcome.
    struct FakeShopify {
        config: AppConfig,
        exchanges: AtomicUsize,
        webhook_error: fn() -> Option<ShopifyError>,
    }

    impl FakeShopify {
        fn new(webhook_error: fn() -> Option<ShopifyError>) -> Self {
            Self {
                config: config(),
                exchanges: AtomicUsize::new(0),
                webhook_error,
            }
        }
    }

    #[async_trait]
    impl ShopifyAdmin for FakeShopify {
        fn decode_session_token(&self, token: &str) -> Result<SessionTokenClaims, ShopifyError> {
            session_token::decode(
                token,
                &self.config.shopify.api_key,
                &self.config.shopify.api_secret,
            )
        }

        async fn token_exchange(
            &self,
            shop: &ShopDomain,
            _session_token: &str,
        ) -> Result<Session, ShopifyError> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            Ok(Session::offline(
                shop.clone(),
                SecretString::from("shpat_exchanged"),
                Some("read_products".to_string()),
            ))
        }

        async fn register_webhooks(&self, _session: &Session) -> Result<(), ShopifyError> {
            (self.webhook_error)().map_or(Ok(()), Err)
        }

        async fn products(
            &self,
            _session: &Session,
            _first: i64,
        ) -> Result<Vec<crate::shopify::Product>, ShopifyError> {
            Ok(vec![])
        }
    }

    fn state(shopify: Arc<FakeShopify>) -> (AppState, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState::new(config(), sessions.clone(), shopify);
        (state, sessions)
    }

    fn token(dest: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionTokenClaims {
            iss: format!("{dest}/admin"),
            dest: dest.to_string(),
            aud: "abc123".to_string(),
            sub: Some("42".to_string()),
            exp: now + 60,
            nbf: now - 5,
            iat: now - 5,
            jti: "jti-1".to_string(),
            sid: None,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"f3b1c9e2a7d84c05b6e19a2f0d7c3b58"),
        )
        .unwrap()
    }

    fn shop() -> ShopDomain {
        ShopDomain::parse("my-store.myshopify.com").unwrap()
    }

    #[tokio::test]
    async fn test_active_session_is_reused_without_exchange() {
        let shopify = Arc::new(FakeShopify::new(|| None));
        let (state, sessions) = state(shopify.clone());
        let stored = Session::offline(shop(), SecretString::from("shpat_stored"), None);
        sessions.store(&stored).await.unwrap();

        let request = request_with_token_header(&token("https://my-store.myshopify.com"));
        let session = assert_session(&state, &request).await.unwrap();

        assert_eq!(session.id, stored.id);
        assert_eq!(shopify.exchanges.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_session_is_exchanged_and_stored() {
        let shopify = Arc::new(FakeShopify::new(|| None));
        let (state, sessions) = state(shopify.clone());

        let request = request_with_token_header(&token("https://my-store.myshopify.com"));
        let session = assert_session(&state, &request).await.unwrap();

        assert_eq!(session.id.as_str(), "offline_my-store.myshopify.com");
        assert_eq!(shopify.exchanges.load(Ordering::SeqCst), 1);
        assert!(sessions.load(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recognized_webhook_error_is_swallowed() {
        let shopify = Arc::new(FakeShopify::new(|| {
            Some(ShopifyError::UserError("Address for this topic has already been taken".to_string()))
        }));
        let (state, _) = state(shopify);

        let session = authenticate_session(&state, &shop(), "token", None).await;
        assert!(session.is_ok());
    }

    #[tokio::test]
    async fn test_unrecognized_webhook_error_fails_after_storing() {
        let shopify = Arc::new(FakeShopify::new(|| {
            Some(ShopifyError::InvalidSessionToken("boom".to_string()))
        }));
        let (state, sessions) = state(shopify);

        let result = authenticate_session(&state, &shop(), "token", None).await;
        assert!(matches!(
            result,
            Err(AuthRejection::Error(AppError::WebhookRegistration(_)))
        ));
        assert!(
            sessions
                .load(&SessionId::offline(&shop()))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_token_for_other_app_is_rejected_with_retry() {
        let shopify = Arc::new(FakeShopify::new(|| None));
        let (state, _) = state(shopify.clone());

        let forged = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({
                "iss": "https://my-store.myshopify.com/admin",
                "dest": "https://my-store.myshopify.com",
                "aud": "another-app",
                "exp": Utc::now().timestamp() + 60,
                "nbf": Utc::now().timestamp() - 5,
                "iat": Utc::now().timestamp() - 5,
                "jti": "jti-2",
            }),
            &jsonwebtoken::EncodingKey::from_secret(b"f3b1c9e2a7d84c05b6e19a2f0d7c3b58"),
        )
        .unwrap();

        let result = assert_session(&state, &request_with_token_header(&forged)).await;
        assert!(matches!(result, Err(AuthRejection::InvalidSessionToken)));
        assert_eq!(shopify.exchanges.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_param() {
        let mut params = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "3".to_string()),
        ];
        set_param(&mut params, "a", "x".to_string());
        assert_eq!(
            params,
            vec![
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );

        set_param(&mut params, "c", "y".to_string());
        assert_eq!(params.last().unwrap(), &("c".to_string(), "y".to_string()));
    }
}
