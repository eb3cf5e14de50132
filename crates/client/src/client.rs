//! The API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use shopify_embedded_core::auth::{SESSION_TOKEN_HEADER, routes};
use thiserror::Error;
use tracing::instrument;

use crate::host::{IdTokenSource, LoadingIndicator, Navigator};

/// Retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;

/// Fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Statuses worth another attempt.
const RETRY_STATUSES: &[u16] = &[408, 409, 425, 429, 500, 502, 503, 504];

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The app URL could not be parsed.
    #[error("Invalid app URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns true if another attempt might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => RETRY_STATUSES.contains(status),
            Self::InvalidUrl(_) | Self::Decode(_) => false,
        }
    }

    /// Returns true if the API rejected the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Client for the app's `/api` routes.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn IdTokenSource>,
    loading: Arc<dyn LoadingIndicator>,
    navigator: Arc<dyn Navigator>,
    retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the app served at `app_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `app_url` is not an absolute URL.
    pub fn new(
        app_url: &str,
        tokens: Arc<dyn IdTokenSource>,
        loading: Arc<dyn LoadingIndicator>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let app_url = url::Url::parse(app_url)?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/api", app_url.as_str().trim_end_matches('/')),
            tokens,
            loading,
            navigator,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` an API path and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once retries are exhausted.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// `POST` a JSON body to an API path and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once retries are exhausted.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Send a request, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once retries are exhausted. A 401 is
    /// never retried; it navigates to the login page instead.
    #[instrument(skip(self, body), fields(base_url = %self.base_url))]
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            self.loading.set_loading(true);
            let result = self.send_once(method.clone(), &url, body).await;
            self.loading.set_loading(false);

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if error.is_unauthorized() {
                tracing::debug!("Session rejected, navigating to login");
                self.navigator.navigate_to(routes::LOGIN);
                return Err(error);
            }

            if attempt >= self.retries || !error.is_retryable() {
                return Err(error);
            }

            attempt += 1;
            tracing::warn!(%error, attempt, "API request failed, retrying");
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn send_once<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method, url);
        if let Some(token) = self.tokens.id_token().await {
            request = request.header(SESSION_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if status == StatusCode::NO_CONTENT || text.is_empty() {
            return Ok(serde_json::from_str("null")?);
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
