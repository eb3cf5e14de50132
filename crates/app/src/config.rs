//! App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOPIFY_API_KEY` - App client ID from the Partner dashboard
//! - `SHOPIFY_API_SECRET` - App client secret (signs session tokens and webhooks)
//! - `HOST` - Public URL the app is served from (e.g., `https://my-app.fly.dev`)
//!
//! ## Optional
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2024-04)
//! - `SHOPIFY_SCOPES` - Comma-separated scopes a session must cover to stay active
//! - `SHOPIFY_WEBHOOK_PATH` - Webhook callback path (default: /api/webhooks)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use shopify_embedded_core::AuthScopes;
use shopify_embedded_core::auth::routes;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2024-04";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the app, without a trailing slash
    pub app_url: String,
    /// Shopify app credentials and API settings
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
}

/// Shopify app configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// App client ID; also the expected session token audience
    pub api_key: String,
    /// App client secret
    pub api_secret: SecretString,
    /// Admin API version (e.g., 2024-04)
    pub api_version: String,
    /// Scopes an offline session must cover to be reused
    pub scopes: AuthScopes,
    /// Path webhook subscriptions are registered against
    pub webhook_path: String,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("scopes", &self.scopes)
            .field("webhook_path", &self.webhook_path)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;
        let app_url = normalize_app_url(&get_required_env("HOST")?)?;

        let shopify = ShopifyConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let json_logs =
            get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            host,
            port,
            app_url,
            shopify,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            json_logs,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL Shopify delivers webhooks to.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.app_url, self.shopify.webhook_path)
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let webhook_path = get_env_or_default("SHOPIFY_WEBHOOK_PATH", routes::WEBHOOKS);
        if !webhook_path.starts_with('/') || webhook_path.contains(['?', '#', '{']) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_WEBHOOK_PATH".to_string(),
                "must be a plain absolute path".to_string(),
            ));
        }

        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_validated_secret("SHOPIFY_API_SECRET")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            scopes: AuthScopes::parse(&get_env_or_default("SHOPIFY_SCOPES", "")),
            webhook_path,
        })
    }

    /// Scopes to check sessions against, if any are configured.
    #[must_use]
    pub fn required_scopes(&self) -> Option<&AuthScopes> {
        (!self.scopes.is_empty()).then_some(&self.scopes)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate the public app URL and strip any trailing slash.
fn normalize_app_url(raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;

    if url.host_str().is_none() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "HOST".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the Partner dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_shopify_config() -> ShopifyConfig {
        ShopifyConfig {
            api_key: "abc123".to_string(),
            api_secret: SecretString::from("f3b1c9e2a7d84c05b6e19a2f0d7c3b58"),
            api_version: DEFAULT_API_VERSION.to_string(),
            scopes: AuthScopes::default(),
            webhook_path: routes::WEBHOOKS.to_string(),
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("") < f64::EPSILON);
        assert!(shannon_entropy("aaaa") < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.001);
        assert!(shannon_entropy("f3b1c9e2a7d84c05b6e19a2f0d7c3b58") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_validate_secret_rejects_placeholders() {
        assert!(validate_secret_strength("your-api-secret-here", "TEST").is_err());
        assert!(validate_secret_strength("changeme123456789", "TEST").is_err());
    }

    #[test]
    fn test_validate_secret_rejects_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_accepts_random_hex() {
        assert!(validate_secret_strength("f3b1c9e2a7d84c05b6e19a2f0d7c3b58", "TEST").is_ok());
    }

    #[test]
    fn test_normalize_app_url() {
        assert_eq!(
            normalize_app_url("https://my-app.example.dev/").unwrap(),
            "https://my-app.example.dev"
        );
        assert!(normalize_app_url("my-app.example.dev").is_err());
        assert!(normalize_app_url("ftp://my-app.example.dev").is_err());
    }

    #[test]
    fn test_shopify_config_debug_redacts_secret() {
        let config = test_shopify_config();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("f3b1c9e2a7d84c05b6e19a2f0d7c3b58"));
    }

    #[test]
    fn test_required_scopes() {
        let mut config = test_shopify_config();
        assert!(config.required_scopes().is_none());

        config.scopes = AuthScopes::parse("read_products");
        assert!(config.required_scopes().is_some());
    }

    #[test]
    fn test_socket_addr_and_webhook_url() {
        let config = AppConfig {
            database_url: SecretString::from("postgres://localhost/app"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            app_url: "https://my-app.example.dev".to_string(),
            shopify: test_shopify_config(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            json_logs: false,
        };

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.webhook_url(),
            "https://my-app.example.dev/api/webhooks"
        );
    }
}
