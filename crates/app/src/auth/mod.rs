//! Embedded app authentication.
//!
//! - [`request`] - What the flow reads from an inbound request
//! - [`flow`] - The session assertion steps
//! - [`rejection`] - Redirects, bootstrap pages and errors that end a request early
//! - [`pages`] - The App Bridge bootstrap pages

pub mod flow;
pub mod pages;
pub mod rejection;
pub mod request;

pub use flow::{SessionTokenContext, assert_session};
pub use pages::AppBridgePage;
pub use rejection::AuthRejection;
pub use request::AuthRequest;
