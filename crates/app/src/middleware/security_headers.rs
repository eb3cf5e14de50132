//! Security headers middleware.
//!
//! The app is rendered inside the Shopify admin iframe, so it cannot send
//! `X-Frame-Options: DENY`. Framing is restricted with `frame-ancestors`
//! instead: to the requesting shop and the admin when the request names a
//! valid shop, and to the admin and any `myshopify.com` shop otherwise.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS},
    },
    middleware::Next,
    response::Response,
};
use shopify_embedded_core::ShopDomain;
use url::form_urlencoded;

const FALLBACK_FRAME_ANCESTORS: &str =
    "frame-ancestors https://admin.shopify.com https://*.myshopify.com;";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy: frame-ancestors ...` unless the handler set
///   its own policy
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let frame_ancestors = request
        .uri()
        .query()
        .and_then(shop_param)
        .and_then(|shop| {
            HeaderValue::try_from(format!(
                "frame-ancestors https://{shop} https://admin.shopify.com;"
            ))
            .ok()
        })
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_FRAME_ANCESTORS));

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if !headers.contains_key(CONTENT_SECURITY_POLICY) {
        headers.insert(CONTENT_SECURITY_POLICY, frame_ancestors);
    }

    response
}

fn shop_param(query: &str) -> Option<ShopDomain> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "shop")
        .and_then(|(_, value)| ShopDomain::parse(&value).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/custom",
                get(|| async { ([(CONTENT_SECURITY_POLICY, "default-src 'self'")], "ok") }),
            )
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn csp(uri: &str) -> String {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        response
            .headers()
            .get(CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_frame_ancestors_names_the_shop() {
        assert_eq!(
            csp("/?shop=my-store.myshopify.com").await,
            "frame-ancestors https://my-store.myshopify.com https://admin.shopify.com;"
        );
    }

    #[tokio::test]
    async fn test_invalid_shop_falls_back() {
        assert_eq!(csp("/?shop=evil.com").await, FALLBACK_FRAME_ANCESTORS);
        assert_eq!(csp("/").await, FALLBACK_FRAME_ANCESTORS);
    }

    #[tokio::test]
    async fn test_handler_policy_is_kept() {
        assert_eq!(
            csp("/custom?shop=my-store.myshopify.com").await,
            "default-src 'self'"
        );
    }
}
