//! Shopify Admin API client.
//!
//! Performs the token exchange that turns an App Bridge session token into an
//! offline access token, and the GraphQL calls made with that token.

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use shopify_embedded_core::{Session, ShopDomain};
use tracing::instrument;

use crate::config::AppConfig;

use super::queries::{
    GetProducts, WebhookSubscriptionCreate, WebhookSubscriptions, get_products,
    webhook_subscription_create, webhook_subscriptions,
};
use super::{GraphQLError, Product, SessionTokenClaims, ShopifyAdmin, ShopifyError, session_token};

const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";
const OFFLINE_ACCESS_TOKEN_TYPE: &str = "urn:shopify:params:oauth:token-type:offline-access-token";

/// Webhook topics the app subscribes to on install.
const WEBHOOK_TOPICS: &[&str] = &["APP_UNINSTALLED"];

/// Shopify Admin API client.
///
/// Cheap to clone; construct once at startup and share.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    webhook_url: String,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

/// Token exchange request body.
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    subject_token: &'a str,
    subject_token_type: &'static str,
    requested_token_type: &'static str,
}

/// Token exchange response from Shopify.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    #[serde(default)]
    scope: Option<String>,
}

impl AdminClient {
    /// Create a new Admin API client.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                api_key: config.shopify.api_key.clone(),
                api_secret: config.shopify.api_secret.clone(),
                api_version: config.shopify.api_version.clone(),
                webhook_url: config.webhook_url(),
            }),
        }
    }

    fn graphql_endpoint(&self, shop: &ShopDomain) -> String {
        format!(
            "https://{shop}/admin/api/{}/graphql.json",
            self.inner.api_version
        )
    }

    /// Execute a GraphQL operation with a session's access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Shopify answers with a
    /// non-success status, or the response carries GraphQL errors.
    pub async fn graphql<Q: GraphQLQuery>(
        &self,
        session: &Session,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(self.graphql_endpoint(&session.shop))
            .header("X-Shopify-Access-Token", session.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(2, |secs| secs.ceil() as u64);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_graphql_response(&text)
    }

    /// Subscribe one topic unless a subscription to our callback exists.
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    async fn ensure_webhook(&self, session: &Session, topic: &str) -> Result<(), ShopifyError> {
        let existing = self
            .graphql::<WebhookSubscriptions>(
                session,
                webhook_subscriptions::Variables {
                    topics: vec![topic.to_string()],
                },
            )
            .await?;

        let registered = existing.webhook_subscriptions.edges.iter().any(|edge| {
            edge.node.endpoint.callback_url.as_deref() == Some(self.inner.webhook_url.as_str())
        });
        if registered {
            tracing::debug!("Webhook already registered");
            return Ok(());
        }

        let created = self
            .graphql::<WebhookSubscriptionCreate>(
                session,
                webhook_subscription_create::Variables {
                    topic: topic.to_string(),
                    webhook_subscription: webhook_subscription_create::WebhookSubscriptionInput {
                        callback_url: self.inner.webhook_url.clone(),
                        format: "JSON".to_string(),
                    },
                },
            )
            .await?;

        if let Some(payload) = created.webhook_subscription_create
            && !payload.user_errors.is_empty()
        {
            let messages: Vec<String> = payload
                .user_errors
                .into_iter()
                .map(|e| e.message)
                .collect();
            return Err(ShopifyError::UserError(messages.join("; ")));
        }

        tracing::info!("Webhook registered");
        Ok(())
    }
}

#[async_trait]
impl ShopifyAdmin for AdminClient {
    fn decode_session_token(&self, token: &str) -> Result<SessionTokenClaims, ShopifyError> {
        session_token::decode(token, &self.inner.api_key, &self.inner.api_secret)
    }

    #[instrument(skip_all, fields(shop = %shop))]
    async fn token_exchange(
        &self,
        shop: &ShopDomain,
        session_token: &str,
    ) -> Result<Session, ShopifyError> {
        let url = format!("https://{shop}/admin/oauth/access_token");

        let body = TokenExchangeRequest {
            client_id: &self.inner.api_key,
            client_secret: self.inner.api_secret.expose_secret(),
            grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
            subject_token: session_token,
            subject_token_type: ID_TOKEN_TYPE,
            requested_token_type: OFFLINE_ACCESS_TOKEN_TYPE,
        };

        let response = self
            .inner
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ShopifyError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let token: TokenExchangeResponse = serde_json::from_str(&text)?;
        tracing::info!("Exchanged session token for offline access token");

        Ok(Session::offline(
            shop.clone(),
            SecretString::from(token.access_token),
            token.scope,
        ))
    }

    async fn register_webhooks(&self, session: &Session) -> Result<(), ShopifyError> {
        for topic in WEBHOOK_TOPICS {
            self.ensure_webhook(session, topic).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, session), fields(shop = %session.shop))]
    async fn products(&self, session: &Session, first: i64) -> Result<Vec<Product>, ShopifyError> {
        let data = self
            .graphql::<GetProducts>(session, get_products::Variables { first })
            .await?;

        Ok(data
            .products
            .edges
            .into_iter()
            .map(|edge| Product {
                id: edge.node.id,
                handle: edge.node.handle,
                title: edge.node.title,
            })
            .collect())
    }
}

/// Split a GraphQL response body into data or errors.
fn parse_graphql_response<T: DeserializeOwned>(text: &str) -> Result<T, ShopifyError> {
    let response: GraphQLResponse<T> = serde_json::from_str(text)?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        return Err(ShopifyError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    path: e.path,
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        ShopifyError::GraphQL(vec![GraphQLError {
            message: "No data in response".to_string(),
            path: vec![],
        }])
    })
}
