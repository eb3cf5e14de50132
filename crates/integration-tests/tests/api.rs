//! `/api` routes and webhook deliveries.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use shopify_embedded_integration_tests::{
    API_SECRET, SHOP, TestApp, body_string, valid_token, webhook_signature,
};

#[tokio::test]
async fn test_products_with_session_token() {
    let app = TestApp::new();
    app.store_session("shpat_stored").await;

    let response = app.get_with_token("/api/products", &valid_token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let products: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        products,
        serde_json::json!([{
            "id": "gid://shopify/Product/1",
            "handle": "snowboard",
            "title": "Snowboard",
        }])
    );
    assert_eq!(app.shopify.exchanges(), 0);
}

#[tokio::test]
async fn test_products_without_token_or_shop_goes_to_login() {
    let app = TestApp::new();

    let response = app.get("/api/products").await;

    assert_eq!(response.status(), StatusCode::FOUND);
}

fn delivery(topic: &str, body: &'static str, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks")
        .header("x-shopify-topic", topic)
        .header("x-shopify-shop-domain", SHOP)
        .header("x-shopify-hmac-sha256", signature)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_app_uninstalled_deletes_sessions() {
    let app = TestApp::new();
    app.store_session("shpat_stored").await;
    let body = r#"{"id":1}"#;

    let response = app
        .send(delivery(
            "app/uninstalled",
            body,
            &webhook_signature(API_SECRET, body.as_bytes()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.stored_session().await.is_none());
}

#[tokio::test]
async fn test_unsigned_delivery_is_rejected() {
    let app = TestApp::new();
    app.store_session("shpat_stored").await;
    let body = r#"{"id":1}"#;

    let response = app
        .send(delivery(
            "app/uninstalled",
            body,
            &webhook_signature("some-other-secret", body.as_bytes()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.stored_session().await.is_some());
}

#[tokio::test]
async fn test_other_topics_are_acknowledged() {
    let app = TestApp::new();
    app.store_session("shpat_stored").await;
    let body = r#"{"id":1}"#;

    let response = app
        .send(delivery(
            "products/update",
            body,
            &webhook_signature(API_SECRET, body.as_bytes()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.stored_session().await.is_some());
}
