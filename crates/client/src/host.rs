//! What the client needs from the page hosting it.
//!
//! In a browser these are App Bridge (`shopify.idToken()`,
//! `shopify.loading()`) and the router; tools can plug in their own.

use async_trait::async_trait;

/// Source of App Bridge id tokens.
#[async_trait]
pub trait IdTokenSource: Send + Sync {
    /// A fresh id token, or `None` if the host cannot provide one.
    async fn id_token(&self) -> Option<String>;
}

/// Loading indicator shown while requests are in flight.
pub trait LoadingIndicator: Send + Sync {
    /// Turn the indicator on or off.
    fn set_loading(&self, loading: bool);
}

/// In-app navigation.
pub trait Navigator: Send + Sync {
    /// Navigate to an app path.
    fn navigate_to(&self, path: &str);
}
