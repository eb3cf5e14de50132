//! Persisted shop sessions.
//!
//! A [`Session`] is the grant a shop has given this app: an Admin API access
//! token plus the bookkeeping needed to decide whether it can still be used.
//! Sessions are minted by token exchange, stored keyed by [`SessionId`], and
//! replaced wholesale when a new token is exchanged.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::scopes::AuthScopes;
use super::shop::ShopDomain;

/// How close to expiry a session is already treated as expired.
const EXPIRY_MARGIN_MS: i64 = 500;

/// Identifier a session is stored under.
///
/// Offline sessions are keyed `offline_{shop}`; online sessions are keyed
/// `{shop}_{user_id}`. Both are derived, never random, so the same shop always
/// maps back to the same record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// The offline session id for a shop.
    #[must_use]
    pub fn offline(shop: &ShopDomain) -> Self {
        Self(format!("offline_{shop}"))
    }

    /// The online session id for a shop and staff user.
    #[must_use]
    pub fn online(shop: &ShopDomain, user_id: i64) -> Self {
        Self(format!("{shop}_{user_id}"))
    }

    /// Wrap an id read back from storage.
    #[must_use]
    pub const fn from_stored(id: String) -> Self {
        Self(id)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An authenticated shop-to-app grant.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Session {
    /// Storage key.
    pub id: SessionId,
    /// Shop the grant belongs to.
    pub shop: ShopDomain,
    /// OAuth state value; empty for token-exchange sessions.
    pub state: String,
    /// Online (per staff user, expiring) or offline (per shop, permanent).
    pub is_online: bool,
    /// Granted scopes as returned by Shopify.
    pub scope: Option<String>,
    /// Expiry for online sessions. Offline sessions never expire.
    pub expires: Option<DateTime<Utc>>,
    /// Admin API access token.
    pub access_token: SecretString,
}

impl Session {
    /// Build an offline session for a freshly exchanged token.
    #[must_use]
    pub fn offline(shop: ShopDomain, access_token: SecretString, scope: Option<String>) -> Self {
        Self {
            id: SessionId::offline(&shop),
            shop,
            state: String::new(),
            is_online: false,
            scope,
            expires: None,
            access_token,
        }
    }

    /// Build an online session for a staff user.
    #[must_use]
    pub fn online(
        shop: ShopDomain,
        user_id: i64,
        access_token: SecretString,
        scope: Option<String>,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::online(&shop, user_id),
            shop,
            state: String::new(),
            is_online: true,
            scope,
            expires: Some(expires),
            access_token,
        }
    }

    /// Returns true if the session expires within the safety margin of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires
            .is_some_and(|expires| expires - Duration::milliseconds(EXPIRY_MARGIN_MS) < now)
    }

    /// Returns true if the session can be used for Admin API calls.
    ///
    /// A session is active when it carries an access token, is not about to
    /// expire, and (if `required` is given) its granted scope covers
    /// `required`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>, required: Option<&AuthScopes>) -> bool {
        let has_token = !self.access_token.expose_secret().is_empty();
        let scopes_ok = required.is_none_or(|required| {
            AuthScopes::parse(self.scope.as_deref().unwrap_or_default()).covers(required)
        });

        has_token && !self.is_expired(now) && scopes_ok
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("state", &self.state)
            .field("is_online", &self.is_online)
            .field("scope", &self.scope)
            .field("expires", &self.expires)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
