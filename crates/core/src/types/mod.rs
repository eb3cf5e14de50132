//! Core types for the embedded app.
//!
//! This module provides type-safe wrappers for the values the auth flow
//! passes around.

pub mod scopes;
pub mod session;
pub mod shop;

pub use scopes::AuthScopes;
pub use session::{Session, SessionId};
pub use shop::{Host, HostError, ShopDomain, ShopError};
