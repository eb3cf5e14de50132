//! Route paths, header names and query parameters shared by the server and
//! its clients.

/// Header carrying the App Bridge session token.
///
/// Used instead of `Authorization`, which the reverse proxy in front of the
/// app overwrites with its own value.
pub const SESSION_TOKEN_HEADER: &str = "shopify-session-token";

/// Response header telling App Bridge to fetch a new token and retry.
pub const RETRY_INVALID_SESSION_HEADER: &str = "X-Shopify-Retry-Invalid-Session-Request";

/// Query parameter carrying the session token on document requests.
pub const SESSION_TOKEN_PARAM: &str = "id_token";

/// Query parameter the bounce page reloads into once it has a token.
pub const RELOAD_PARAM: &str = "shopify-reload";

/// Query parameter naming the exit-iframe destination.
pub const EXIT_IFRAME_PARAM: &str = "exitIframe";

/// Auth-related paths.
pub mod routes {
    /// Prefix of every auth route.
    pub const AUTH: &str = "/auth";
    /// Redirects to the shop's install URL.
    pub const AUTH_LOGIN: &str = "/auth/login";
    /// Bounce page used to mint a fresh session token inside the iframe.
    pub const PATCH_SESSION_TOKEN: &str = "/auth/session-token";
    /// Page that breaks out of the admin iframe.
    pub const EXIT_IFRAME: &str = "/auth/exit-iframe";
    /// "Enter your shop" page.
    pub const LOGIN: &str = "/login";
    /// Webhook delivery endpoint.
    pub const WEBHOOKS: &str = "/api/webhooks";
}
