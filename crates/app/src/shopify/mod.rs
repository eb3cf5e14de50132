//! Shopify Admin API access.
//!
//! # Architecture
//!
//! - [`session_token`] verifies App Bridge session tokens (HS256, signed with
//!   the app secret)
//! - [`AdminClient`] performs token exchange, webhook registration and
//!   GraphQL calls over `reqwest`
//! - [`ShopifyAdmin`] is the seam the auth flow calls through, so the flow can
//!   run against a fake in tests
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_embedded_app::shopify::{AdminClient, ShopifyAdmin};
//!
//! let client = AdminClient::new(&config);
//!
//! let claims = client.decode_session_token(&token)?;
//! let session = client.token_exchange(&claims.shop()?, &token).await?;
//! client.register_webhooks(&session).await?;
//! ```

mod client;
pub mod queries;
pub mod session_token;

pub use client::AdminClient;
pub use session_token::SessionTokenClaims;

use async_trait::async_trait;
use serde::Serialize;
use shopify_embedded_core::{Session, ShopDomain};
use thiserror::Error;

/// Errors that can occur when talking to Shopify.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The session token failed verification.
    #[error("Invalid session token: {0}")]
    InvalidSessionToken(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Returns true for errors Shopify itself reported.
    ///
    /// Recognized errors carry a Shopify answer (a status, GraphQL errors,
    /// user errors). Everything else means the call did not complete in a way
    /// we understand.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::GraphQL(_)
                | Self::RateLimited(_)
                | Self::Unauthorized(_)
                | Self::UserError(_)
        )
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A product as returned to the embedded UI.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Product {
    /// Global ID (e.g., `gid://shopify/Product/123`).
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
}

/// Operations the auth flow and API routes need from Shopify.
#[async_trait]
pub trait ShopifyAdmin: Send + Sync {
    /// Verify a session token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::InvalidSessionToken` if the signature, audience
    /// or timing claims do not check out.
    fn decode_session_token(&self, token: &str) -> Result<SessionTokenClaims, ShopifyError>;

    /// Exchange a session token for an offline access token.
    async fn token_exchange(
        &self,
        shop: &ShopDomain,
        session_token: &str,
    ) -> Result<Session, ShopifyError>;

    /// Make sure every webhook the app relies on is subscribed for the shop.
    async fn register_webhooks(&self, session: &Session) -> Result<(), ShopifyError>;

    /// Fetch the first `first` products of the shop.
    async fn products(&self, session: &Session, first: i64) -> Result<Vec<Product>, ShopifyError>;
}
