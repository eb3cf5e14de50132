//! Webhook delivery endpoint.
//!
//! Shopify signs every delivery with the app's API secret
//! (`X-Shopify-Hmac-Sha256`, base64 HMAC-SHA256 of the raw body). Unsigned
//! or mis-signed deliveries are rejected before the body is looked at.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use shopify_embedded_core::ShopDomain;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Signature header.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
/// Topic header, e.g. `app/uninstalled`.
pub const TOPIC_HEADER: &str = "x-shopify-topic";
/// Shop the delivery is about.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Topics this app subscribes to, in the REST form of the header.
pub const APP_UNINSTALLED: &str = "app/uninstalled";

/// Receive a webhook delivery.
///
/// # Errors
///
/// Returns 401 for a bad signature, 400 for a malformed shop header and 500
/// if sessions cannot be deleted.
#[instrument(skip_all, fields(topic, shop))]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = header(&headers, HMAC_HEADER).unwrap_or_default();
    if !verify_signature(&state.config().shopify.api_secret, &body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::Unauthorized("invalid webhook signature".to_string()));
    }

    let topic = header(&headers, TOPIC_HEADER).unwrap_or_default();
    let span = tracing::Span::current();
    span.record("topic", topic);

    if topic != APP_UNINSTALLED {
        tracing::debug!("Ignoring webhook topic");
        return Ok(StatusCode::OK);
    }

    let shop = header(&headers, SHOP_DOMAIN_HEADER)
        .and_then(|shop| ShopDomain::parse(shop).ok())
        .ok_or_else(|| AppError::BadRequest("missing or invalid shop domain".to_string()))?;
    span.record("shop", shop.as_str());

    let deleted = state.sessions().delete_by_shop(&shop).await?;
    tracing::info!(deleted, "App uninstalled, deleted shop sessions");

    Ok(StatusCode::OK)
}

/// Verify a delivery signature in constant time.
#[must_use]
pub fn verify_signature(secret: &SecretString, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature() {
        let secret = SecretString::from("f3b1c9e2a7d84c05b6e19a2f0d7c3b58");
        let body = br#"{"id":1}"#;
        let signature = sign("f3b1c9e2a7d84c05b6e19a2f0d7c3b58", body);

        assert!(verify_signature(&secret, body, &signature));
        assert!(!verify_signature(&secret, br#"{"id":2}"#, &signature));
        assert!(!verify_signature(&secret, body, &sign("other", body)));
        assert!(!verify_signature(&secret, body, "not base64!"));
        assert!(!verify_signature(&secret, body, ""));
    }
}
