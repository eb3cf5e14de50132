//! Session persistence.
//!
//! # Tables
//!
//! - `sessions`: one row per Shopify session, keyed by session id (`offline_{shop}`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/app/migrations/` and run via:
//! ```bash
//! cargo run -p shopify-embedded-cli -- migrate
//! ```

pub mod sessions;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use sessions::{MemorySessionStore, PgSessionStore, SessionStore};

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row no longer parses (bad shop domain, negative expiry...).
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Open the `PostgreSQL` pool backing the session store.
///
/// Every gated request does one primary-key lookup and the occasional upsert,
/// so a small pool is enough.
///
/// # Errors
///
/// Returns `sqlx::Error` if no connection can be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url.expose_secret())
        .await
}
