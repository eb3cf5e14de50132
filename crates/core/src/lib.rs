//! Shopify Embedded Core - Shared types library.
//!
//! This crate provides the types shared by the embedded app components:
//! - `app` - The axum server and its session gate
//! - `client` - The authenticated API client
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types and constants - no I/O, no database
//! access, no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Sanitized shop/host values, session ids and sessions
//! - [`auth`] - Route paths and header names of the auth flow

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod types;

pub use types::*;
