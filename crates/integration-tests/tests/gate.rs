//! Request gate: excluded paths and document-load redirects.

use axum::http::StatusCode;
use shopify_embedded_integration_tests::{HOST, SHOP, TestApp, body_string, location};

#[tokio::test]
async fn test_excluded_paths_are_not_asserted() {
    let app = TestApp::new();

    for path in ["/health", "/health/ready", "/login", "/static/missing.css"] {
        let response = app.get(path).await;
        assert!(
            !response.status().is_redirection(),
            "{path} answered {}",
            response.status()
        );
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    assert_eq!(app.shopify.exchanges(), 0);
}

#[tokio::test]
async fn test_health_answers_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");

    // No pool configured, so readiness has nothing to check
    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_shop_and_host_redirects_to_login() {
    let app = TestApp::new();

    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_invalid_shop_redirects_to_login() {
    let app = TestApp::new();

    let response = app
        .get(&format!("/?shop=evil.example.com&host={HOST}&embedded=1"))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_not_embedded_redirects_into_admin() {
    let app = TestApp::new();

    let response = app.get(&format!("/?shop={SHOP}&host={HOST}")).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        "https://admin.shopify.com/store/my-store/apps/abc123"
    );
}

#[tokio::test]
async fn test_embedded_without_token_goes_to_bounce_page() {
    let app = TestApp::new();

    let response = app
        .get(&format!("/settings?shop={SHOP}&host={HOST}&embedded=1&id_token="))
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let target = location(&response);
    assert!(target.starts_with(&format!(
        "/auth/session-token?shop={SHOP}&host={HOST}&embedded=1&shopify-reload="
    )));

    let reload = target.split("shopify-reload=").nth(1).unwrap();
    assert_eq!(
        reload,
        format!(
            "https%3A%2F%2Fmy-app.example.dev%2Fsettings%3Fshop%3D{SHOP}%26host%3D{HOST}%26embedded%3D1"
        )
    );
    assert!(!target.contains("id_token"));
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let app = TestApp::new();

    let response = app.get(&format!("/?shop={SHOP}")).await;

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(
        headers.get("content-security-policy").unwrap(),
        "frame-ancestors https://my-store.myshopify.com https://admin.shopify.com;"
    );
    assert!(headers.get("x-request-id").is_some());
}
