//! Shop domain and host parameter types.
//!
//! Shopify passes `shop` and `host` query parameters to every embedded app
//! load. Neither can be trusted as-is: both are sanitized here before the
//! auth flow uses them to build redirects or look up sessions.

use core::fmt;
use std::sync::LazyLock;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Domains a shop may live under.
const SHOP_DOMAINS: &str = r"myshopify\.com|shopify\.com|myshopify\.io|shop\.dev";

/// Domains a decoded `host` may point at.
const HOST_ORIGINS: &str = r"myshopify\.com|shopify\.com|myshopify\.io|spin\.dev|shop\.dev";

static SHOP_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[a-zA-Z0-9][a-zA-Z0-9_-]*\.({SHOP_DOMAINS})/*$"
    ))
    .expect("Invalid regex")
});

static SHOP_ADMIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^admin\.({SHOP_DOMAINS})/store/([a-zA-Z0-9][a-zA-Z0-9_-]*)$"
    ))
    .expect("Invalid regex")
});

static BASE64_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z+/]+={0,2}$").expect("Invalid regex"));

static HOST_ORIGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\.({HOST_ORIGINS})$")).expect("Invalid regex"));

/// Base64 with optional padding; App Bridge sends `host` both ways.
const HOST_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The input string is empty.
    #[error("shop cannot be empty")]
    Empty,
    /// The input is not a `*.myshopify.com` style domain.
    #[error("invalid shop domain: {0}")]
    Invalid(String),
}

/// A sanitized shop domain, e.g. `my-store.myshopify.com`.
///
/// ## Accepted forms
///
/// - `my-store.myshopify.com` (trailing slashes are dropped)
/// - `admin.shopify.com/store/my-store`, which is rewritten to
///   `my-store.myshopify.com`
///
/// ## Examples
///
/// ```
/// use shopify_embedded_core::ShopDomain;
///
/// assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
/// assert_eq!(
///     ShopDomain::parse("admin.shopify.com/store/my-store").unwrap().as_str(),
///     "my-store.myshopify.com"
/// );
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("evil.example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Parse and sanitize a `shop` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or is not a Shopify shop domain.
    pub fn parse(s: &str) -> Result<Self, ShopError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ShopError::Empty);
        }

        let candidate = SHOP_ADMIN_RE
            .captures(trimmed)
            .and_then(|caps| caps.get(2))
            .map_or_else(
                || trimmed.to_owned(),
                |handle| format!("{}.myshopify.com", handle.as_str()),
            );

        if !SHOP_URL_RE.is_match(&candidate) {
            return Err(ShopError::Invalid(s.to_owned()));
        }

        Ok(Self(candidate.trim_end_matches('/').to_owned()))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShopDomain` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The unified admin path for `*.myshopify.com` shops
    /// (`admin.shopify.com/store/{handle}`).
    ///
    /// Returns `None` for shops on other domains.
    #[must_use]
    pub fn admin_path(&self) -> Option<String> {
        self.0
            .strip_suffix(".myshopify.com")
            .map(|handle| format!("admin.shopify.com/store/{handle}"))
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored shops were sanitized on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Errors that can occur when parsing a [`Host`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The input string is empty.
    #[error("host cannot be empty")]
    Empty,
    /// The input is not base64.
    #[error("host is not base64 encoded")]
    NotBase64,
    /// The decoded value does not point at a Shopify admin origin.
    #[error("host does not point at a Shopify origin: {0}")]
    UnknownOrigin(String),
}

/// The base64-encoded `host` parameter Shopify appends to embedded app URLs.
///
/// Holds both the raw parameter and its decoded form
/// (e.g. `admin.shopify.com/store/my-store`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    raw: String,
    decoded: String,
}

impl Host {
    /// Parse and sanitize a `host` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not base64, does not decode to UTF-8,
    /// or decodes to a host outside the Shopify origins.
    pub fn parse(s: &str) -> Result<Self, HostError> {
        if s.is_empty() {
            return Err(HostError::Empty);
        }
        if !BASE64_RE.is_match(s) {
            return Err(HostError::NotBase64);
        }

        let bytes = HOST_ENGINE.decode(s).map_err(|_| HostError::NotBase64)?;
        let decoded = String::from_utf8(bytes).map_err(|_| HostError::NotBase64)?;

        let hostname = url::Url::parse(&format!("https://{decoded}"))
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .ok_or_else(|| HostError::UnknownOrigin(decoded.clone()))?;

        if !HOST_ORIGIN_RE.is_match(&hostname) {
            return Err(HostError::UnknownOrigin(decoded));
        }

        Ok(Self {
            raw: s.to_owned(),
            decoded,
        })
    }

    /// The parameter exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The decoded admin location, without scheme.
    #[must_use]
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    /// The canonical URL of this app inside the Shopify admin.
    #[must_use]
    pub fn embedded_app_url(&self, api_key: &str) -> String {
        format!("https://{}/apps/{api_key}", self.decoded)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
