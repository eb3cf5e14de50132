//! App Bridge bootstrap pages.
//!
//! The bounce page and the exit-iframe page are the same document: the App
//! Bridge script tag, plus a `window.open` call when the page should navigate
//! the top frame somewhere else.

use askama::Template;
use axum::{
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE, LINK},
    },
    response::{IntoResponse, Response},
};
use shopify_embedded_core::ShopDomain;

use crate::config::AppConfig;
use crate::error::AppError;

/// Where App Bridge is loaded from.
pub const APP_BRIDGE_SCRIPT: &str = "https://cdn.shopify.com/shopifycloud/app-bridge.js";

#[derive(Template)]
#[template(path = "app_bridge.html")]
struct AppBridgeTemplate<'a> {
    api_key: &'a str,
    script_src: &'a str,
    redirect_to: Option<&'a str>,
    target: &'a str,
}

/// A rendered bootstrap page.
#[derive(Debug)]
pub struct AppBridgePage {
    body: String,
    frame_ancestors: Option<String>,
}

impl AppBridgePage {
    /// Render the page.
    ///
    /// `shop` adds the script preload and a `frame-ancestors` policy allowing
    /// the shop's admin to frame the page. `redirect_to` makes the page open
    /// that URL in the top frame once loaded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the template fails to render.
    pub fn render(
        config: &AppConfig,
        shop: Option<&ShopDomain>,
        redirect_to: Option<&str>,
    ) -> Result<Self, AppError> {
        let body = AppBridgeTemplate {
            api_key: &config.shopify.api_key,
            script_src: APP_BRIDGE_SCRIPT,
            redirect_to,
            target: "_top",
        }
        .render()
        .map_err(|e| AppError::Internal(format!("failed to render App Bridge page: {e}")))?;

        let frame_ancestors = shop.map(|shop| {
            format!(
                "frame-ancestors https://{shop} https://admin.shopify.com {};",
                config.app_url
            )
        });

        Ok(Self {
            body,
            frame_ancestors,
        })
    }

    /// The rendered HTML.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl IntoResponse for AppBridgePage {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, self.body).into_response();
        let headers = response.headers_mut();

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html;charset=utf-8"),
        );

        if let Some(policy) = self.frame_ancestors
            && let Ok(policy) = HeaderValue::try_from(policy)
        {
            headers.insert(
                LINK,
                HeaderValue::from_static(
                    "<https://cdn.shopify.com/shopifycloud/app-bridge.js>; rel=\"preload\"; as=\"script\";",
                ),
            );
            headers.insert(CONTENT_SECURITY_POLICY, policy);
        }

        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use shopify_embedded_core::AuthScopes;

    use super::*;
    use crate::config::ShopifyConfig;

    fn config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/app"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            app_url: "https://my-app.example.dev".to_string(),
            shopify: ShopifyConfig {
                api_key: "abc123".to_string(),
                api_secret: SecretString::from("f3b1c9e2a7d84c05b6e19a2f0d7c3b58"),
                api_version: "2024-04".to_string(),
                scopes: AuthScopes::default(),
                webhook_path: "/api/webhooks".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
            json_logs: false,
        }
    }

    #[test]
    fn test_bounce_page_has_only_the_bridge_script() {
        let page = AppBridgePage::render(&config(), None, None).unwrap();
        assert!(page.body().contains(r#"data-api-key="abc123""#));
        assert!(page.body().contains(APP_BRIDGE_SCRIPT));
        assert!(!page.body().contains("window.open"));

        let response = page.into_response();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/html;charset=utf-8"
        );
        assert!(response.headers().get(CONTENT_SECURITY_POLICY).is_none());
    }

    #[test]
    fn test_shop_adds_preload_and_frame_ancestors() {
        let shop = ShopDomain::parse("my-store.myshopify.com").unwrap();
        let response = AppBridgePage::render(&config(), Some(&shop), None)
            .unwrap()
            .into_response();

        assert_eq!(
            response.headers().get(CONTENT_SECURITY_POLICY).unwrap(),
            "frame-ancestors https://my-store.myshopify.com https://admin.shopify.com https://my-app.example.dev;"
        );
        assert!(response.headers().get(LINK).is_some());
    }

    #[test]
    fn test_exit_iframe_opens_destination_in_top_frame() {
        let page = AppBridgePage::render(
            &config(),
            None,
            Some("https://admin.shopify.com/store/my-store/apps/abc123"),
        )
        .unwrap();

        assert!(page.body().contains(
            r#"window.open("https://admin.shopify.com/store/my-store/apps/abc123", "_top")"#
        ));
    }

    #[test]
    fn test_destination_cannot_break_out_of_script() {
        let page = AppBridgePage::render(&config(), None, Some("/x</script><script>alert(1)"))
            .unwrap();
        assert!(!page.body().contains("</script><script>alert(1)"));
    }
}
