//! App Bridge session token verification.
//!
//! Session tokens are HS256 JWTs signed with the app's client secret. The
//! audience is the app's client ID and `dest` is the shop the token was
//! issued for.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopify_embedded_core::ShopDomain;

use super::ShopifyError;

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
const CLOCK_TOLERANCE_SECS: u64 = 10;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Shop admin URL, e.g. `https://my-store.myshopify.com/admin`.
    pub iss: String,
    /// Shop URL, e.g. `https://my-store.myshopify.com`.
    pub dest: String,
    /// App client ID.
    pub aud: String,
    /// Staff user ID.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Not-before time (UTC Unix timestamp).
    pub nbf: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
    /// Admin session ID.
    #[serde(default)]
    pub sid: Option<String>,
}

impl SessionTokenClaims {
    /// The shop this token was issued for, taken from the `dest` hostname.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::InvalidSessionToken` if `dest` is not a URL on
    /// a Shopify shop domain.
    pub fn shop(&self) -> Result<ShopDomain, ShopifyError> {
        let dest = url::Url::parse(&self.dest)
            .map_err(|e| ShopifyError::InvalidSessionToken(format!("invalid dest: {e}")))?;
        let hostname = dest
            .host_str()
            .ok_or_else(|| ShopifyError::InvalidSessionToken("dest has no host".to_string()))?;

        ShopDomain::parse(hostname)
            .map_err(|e| ShopifyError::InvalidSessionToken(format!("invalid dest: {e}")))
    }
}

/// Verify a session token against the app's credentials.
///
/// Checks the HS256 signature, that `aud` is `api_key`, and that the token is
/// within its `nbf`..`exp` window (with a small clock tolerance).
///
/// # Errors
///
/// Returns `ShopifyError::InvalidSessionToken` on any verification failure.
pub fn decode(
    token: &str,
    api_key: &str,
    api_secret: &SecretString,
) -> Result<SessionTokenClaims, ShopifyError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[api_key]);
    validation.validate_nbf = true;
    validation.leeway = CLOCK_TOLERANCE_SECS;

    let data = jsonwebtoken::decode::<SessionTokenClaims>(
        token,
        &DecodingKey::from_secret(api_secret.expose_secret().as_bytes()),
        &validation,
    )
    .map_err(|e| ShopifyError::InvalidSessionToken(e.to_string()))?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    const API_KEY: &str = "abc123";
    const API_SECRET: &str = "f3b1c9e2a7d84c05b6e19a2f0d7c3b58";

    fn claims(now: i64) -> SessionTokenClaims {
        SessionTokenClaims {
            iss: "https://my-store.myshopify.com/admin".to_string(),
            dest: "https://my-store.myshopify.com".to_string(),
            aud: API_KEY.to_string(),
            sub: Some("42".to_string()),
            exp: now + 60,
            nbf: now - 5,
            iat: now - 5,
            jti: "3f1c1a0e-7b54-4c55-9a8e-0b6a5a1d3c2f".to_string(),
            sid: None,
        }
    }

    fn sign(claims: &SessionTokenClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn secret() -> SecretString {
        SecretString::from(API_SECRET)
    }

    #[test]
    fn test_decode_valid_token() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(&claims(now), API_SECRET);

        let decoded = decode(&token, API_KEY, &secret()).unwrap();
        assert_eq!(decoded.dest, "https://my-store.myshopify.com");
        assert_eq!(decoded.shop().unwrap().as_str(), "my-store.myshopify.com");
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let now = chrono::Utc::now().timestamp();
        let token = sign(&claims(now), "a-different-signing-key-0123456789");

        assert!(matches!(
            decode(&token, API_KEY, &secret()),
            Err(ShopifyError::InvalidSessionToken(_))
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_audience() {
        let now = chrono::Utc::now().timestamp();
        let mut other = claims(now);
        other.aud = "someone-else".to_string();
        let token = sign(&other, API_SECRET);

        assert!(decode(&token, API_KEY, &secret()).is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let now = chrono::Utc::now().timestamp();
        let mut expired = claims(now);
        expired.exp = now - 300;
        let token = sign(&expired, API_SECRET);

        assert!(decode(&token, API_KEY, &secret()).is_err());
    }

    #[test]
    fn test_decode_tolerates_small_clock_skew() {
        let now = chrono::Utc::now().timestamp();
        let mut skewed = claims(now);
        skewed.nbf = now + 5;
        let token = sign(&skewed, API_SECRET);

        assert!(decode(&token, API_KEY, &secret()).is_ok());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not-a-jwt", API_KEY, &secret()).is_err());
    }

    #[test]
    fn test_shop_from_foreign_dest() {
        let now = chrono::Utc::now().timestamp();
        let mut foreign = claims(now);
        foreign.dest = "https://evil.example.com".to_string();
        assert!(foreign.shop().is_err());
    }
}
