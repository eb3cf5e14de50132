//! Shopify Embedded Client - calls the app's `/api` with a session token.
//!
//! Every request:
//! - turns the host's loading indicator on, and off again once the request
//!   is finished (whatever the outcome)
//! - carries a fresh App Bridge id token in the `shopify-session-token`
//!   header, never in `Authorization`
//! - is retried up to [`DEFAULT_RETRIES`] times, [`DEFAULT_RETRY_DELAY`]
//!   apart, on transport failures and transient statuses
//!
//! A 401 sends the user to the login page through the host's [`Navigator`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_embedded_client::ApiClient;
//!
//! let api = ApiClient::new("https://my-app.example.dev", bridge.clone(), bridge.clone(), bridge)?;
//! let products: Vec<Product> = api.get("products").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod host;

pub use client::{ApiClient, ClientError, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
pub use host::{IdTokenSource, LoadingIndicator, Navigator};
