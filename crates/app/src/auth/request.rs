//! The parts of an inbound request the auth flow reads.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, Uri, request::Parts},
};
use shopify_embedded_core::auth::{SESSION_TOKEN_HEADER, SESSION_TOKEN_PARAM};
use url::form_urlencoded;

/// Path, query and session token header of a request.
///
/// Query pairs keep their original order so they can be echoed back into
/// redirects unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    path: String,
    query: Vec<(String, String)>,
    session_token_header: Option<String>,
}

impl AuthRequest {
    /// Build from a request URI and headers.
    #[must_use]
    pub fn new(uri: &Uri, headers: &HeaderMap) -> Self {
        let session_token_header = headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        Self {
            path: uri.path().to_owned(),
            query: parse_query(uri.query().unwrap_or_default()),
            session_token_header,
        }
    }

    /// Request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter, if present and non-empty.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// All query pairs, in request order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Session token from the `shopify-session-token` header.
    ///
    /// Its presence is what distinguishes API calls made through App Bridge
    /// from document loads.
    #[must_use]
    pub fn session_token_header(&self) -> Option<&str> {
        self.session_token_header.as_deref()
    }

    /// Session token from the header, falling back to the `id_token` parameter.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token_header()
            .or_else(|| self.param(SESSION_TOKEN_PARAM))
    }

    /// Returns true if the app was loaded inside the Shopify admin.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.param("embedded") == Some("1")
    }
}

impl<S> FromRequestParts<S> for AuthRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(&parts.uri, &parts.headers))
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Encode query pairs the way browsers serialize `URLSearchParams`.
#[must_use]
pub fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn request(uri: &str, header: Option<&str>) -> AuthRequest {
        let mut headers = HeaderMap::new();
        if let Some(token) = header {
            headers.insert(SESSION_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        }
        AuthRequest::new(&uri.parse().unwrap(), &headers)
    }

    #[test]
    fn test_params_keep_order_and_decode() {
        let req = request("/app?shop=a.myshopify.com&host=YQ%3D%3D&embedded=1", None);
        assert_eq!(req.path(), "/app");
        assert_eq!(req.param("host"), Some("YQ=="));
        let keys: Vec<&str> = req.query().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["shop", "host", "embedded"]);
        assert!(req.is_embedded());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let req = request("/?shop=&id_token=", Some(""));
        assert_eq!(req.param("shop"), None);
        assert_eq!(req.session_token(), None);
        assert_eq!(req.session_token_header(), None);
    }

    #[test]
    fn test_header_token_wins_over_param() {
        let req = request("/?id_token=from-param", Some("from-header"));
        assert_eq!(req.session_token(), Some("from-header"));

        let req = request("/?id_token=from-param", None);
        assert_eq!(req.session_token(), Some("from-param"));
    }

    #[test]
    fn test_encode_query_matches_form_encoding() {
        let pairs = vec![
            ("shop".to_string(), "a.myshopify.com".to_string()),
            ("next".to_string(), "https://x.dev/a b?c=d".to_string()),
        ];
        assert_eq!(
            encode_query(&pairs),
            "shop=a.myshopify.com&next=https%3A%2F%2Fx.dev%2Fa+b%3Fc%3Dd"
        );
    }
}
