//! Integration tests for the Shopify embedded app.
//!
//! The full router (gate, security headers, request id, tracing) is driven
//! in-process with `tower::ServiceExt::oneshot`. Shopify is replaced by
//! [`FakeShopify`], which verifies real HS256 session tokens but never
//! touches the network, and sessions live in a `MemorySessionStore`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopify-embedded-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header::LOCATION},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sha2::Sha256;
use shopify_embedded_app::config::{AppConfig, ShopifyConfig};
use shopify_embedded_app::db::{MemorySessionStore, SessionStore};
use shopify_embedded_app::shopify::{
    Product, SessionTokenClaims, ShopifyAdmin, ShopifyError, session_token,
};
use shopify_embedded_app::state::AppState;
use shopify_embedded_core::auth::SESSION_TOKEN_HEADER;
use shopify_embedded_core::{AuthScopes, Session, ShopDomain};
use tower::ServiceExt;

pub const API_KEY: &str = "abc123";
pub const API_SECRET: &str = "f3b1c9e2a7d84c05b6e19a2f0d7c3b58";
pub const APP_URL: &str = "https://my-app.example.dev";
pub const SHOP: &str = "my-store.myshopify.com";
/// `admin.shopify.com/store/my-store`, base64 without padding.
pub const HOST: &str = "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvbXktc3RvcmU";

/// Build a test `AppConfig` with safe defaults.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        app_url: APP_URL.to_string(),
        shopify: ShopifyConfig {
            api_key: API_KEY.to_string(),
            api_secret: SecretString::from(API_SECRET),
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

/// How the fake answers webhook registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Registered,
    /// An error Shopify reported (user error on the mutation).
    Recognized,
    /// An error of a shape the app does not understand.
    Unrecognized,
}

/// Shopify stand-in.
pub struct FakeShopify {
    config: AppConfig,
    webhook_outcome: WebhookOutcome,
    exchanges: AtomicUsize,
    webhook_calls: AtomicUsize,
    reject_exchange: AtomicBool,
}

impl FakeShopify {
    #[must_use]
    pub fn new(webhook_outcome: WebhookOutcome) -> Self {
        Self {
            config: test_config(),
            webhook_outcome,
            exchanges: AtomicUsize::new(0),
            webhook_calls: AtomicUsize::new(0),
            reject_exchange: AtomicBool::new(false),
        }
    }

    /// Token exchanges performed so far.
    #[must_use]
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// Make every following token exchange fail the way Shopify rejects a
    /// bad subject token.
    pub fn reject_token_exchange(&self) {
        self.reject_exchange.store(true, Ordering::SeqCst);
    }

    /// Webhook registrations attempted so far.
    #[must_use]
    pub fn webhook_calls(&self) -> usize {
        self.webhook_calls.load(Ordering::SeqCst)
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
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_exchange.load(Ordering::SeqCst) {
            return Err(ShopifyError::HttpStatus {
                status: 400,
                body: r#"{"error":"invalid_subject_token"}"#.to_string(),
            });
        }
        Ok(Session::offline(
            shop.clone(),
            SecretString::from(format!("shpat_exchanged_{n}")),
            Some("read_products".to_string()),
        ))
    }

    async fn register_webhooks(&self, _session: &Session) -> Result<(), ShopifyError> {
        self.webhook_calls.fetch_add(1, Ordering::SeqCst);
        match self.webhook_outcome {
            WebhookOutcome::Registered => Ok(()),
            WebhookOutcome::Recognized => Err(ShopifyError::UserError(
                "Address for this topic has already been taken".to_string(),
            )),
            WebhookOutcome::Unrecognized => Err(ShopifyError::InvalidSessionToken(
                "unexpected response".to_string(),
            )),
        }
    }

    async fn products(&self, _session: &Session, first: i64) -> Result<Vec<Product>, ShopifyError> {
        let product = Product {
            id: "gid://shopify/Product/1".to_string(),
            handle: "snowboard".to_string(),
            title: "Snowboard".to_string(),
        };
        Ok(std::iter::repeat_n(product, usize::try_from(first).unwrap_or(0)).collect())
    }
}

/// The app router wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub shopify: Arc<FakeShopify>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_webhook_outcome(WebhookOutcome::Registered)
    }

    #[must_use]
    pub fn with_webhook_outcome(outcome: WebhookOutcome) -> Self {
        let shopify = Arc::new(FakeShopify::new(outcome));
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState::new(test_config(), sessions.clone(), shopify.clone());

        Self {
            router: shopify_embedded_app::app(state),
            shopify,
            sessions,
        }
    }

    /// Store an offline session for [`SHOP`] with the given access token.
    pub async fn store_session(&self, access_token: &str) -> Session {
        let session = Session::offline(shop(), SecretString::from(access_token), None);
        self.sessions.store(&session).await.unwrap();
        session
    }

    /// The stored offline session for [`SHOP`], if any.
    pub async fn stored_session(&self) -> Option<Session> {
        self.sessions
            .load(&shopify_embedded_core::SessionId::offline(&shop()))
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// `GET` a document URL, as the admin iframe would.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// `GET` with the session token header, as App Bridge `fetch` would.
    pub async fn get_with_token(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(SESSION_TOKEN_HEADER, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn shop() -> ShopDomain {
    ShopDomain::parse(SHOP).unwrap()
}

/// Sign a session token for `dest` and `aud` with `secret`.
#[must_use]
pub fn sign_token(dest: &str, aud: &str, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionTokenClaims {
        iss: format!("{dest}/admin"),
        dest: dest.to_string(),
        aud: aud.to_string(),
        sub: Some("42".to_string()),
        exp: now + 60,
        nbf: now - 5,
        iat: now - 5,
        jti: format!("jti-{now}"),
        sid: Some("sid-1".to_string()),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// A valid session token for [`SHOP`].
#[must_use]
pub fn valid_token() -> String {
    sign_token(&format!("https://{SHOP}"), API_KEY, API_SECRET)
}

/// Base64 HMAC-SHA256 of `body`, as Shopify signs webhook deliveries.
#[must_use]
pub fn webhook_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// Collect a response body into a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
