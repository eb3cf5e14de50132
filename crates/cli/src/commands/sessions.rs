//! Session management commands.
//!
//! Access tokens are never printed.

use shopify_embedded_app::db::{PgSessionStore, RepositoryError, SessionStore};
use shopify_embedded_core::{Session, ShopDomain};
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionsError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Invalid shop domain: {0}")]
    InvalidShop(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// List stored sessions, optionally for a single shop.
///
/// # Errors
///
/// Returns an error if the shop is invalid or the database is unreachable.
pub async fn list(shop: Option<&str>) -> Result<(), SessionsError> {
    let shop = shop.map(parse_shop).transpose()?;
    let store = PgSessionStore::new(connect().await?);

    let sessions = store.list(shop.as_ref()).await?;

    #[allow(clippy::print_stdout)]
    {
        if sessions.is_empty() {
            println!("No sessions found");
        }
        for session in &sessions {
            println!("{}", format_session(session));
        }
    }

    Ok(())
}

/// Delete every stored session of a shop.
///
/// # Errors
///
/// Returns an error if the shop is invalid or the database is unreachable.
pub async fn delete(shop: &str) -> Result<(), SessionsError> {
    let shop = parse_shop(shop)?;
    let store = PgSessionStore::new(connect().await?);

    let deleted = store.delete_by_shop(&shop).await?;
    tracing::info!(shop = %shop, deleted, "Deleted sessions");

    #[allow(clippy::print_stdout)]
    {
        println!("Deleted {deleted} session(s) for {shop}");
    }

    Ok(())
}

fn parse_shop(shop: &str) -> Result<ShopDomain, SessionsError> {
    ShopDomain::parse(shop).map_err(|_| SessionsError::InvalidShop(shop.to_string()))
}

fn format_session(session: &Session) -> String {
    let kind = if session.is_online { "online" } else { "offline" };
    let expires = session
        .expires
        .map_or_else(|| "never".to_string(), |expires| expires.to_rfc3339());

    format!(
        "{}\t{}\t{kind}\tscope={}\texpires={expires}",
        session.id,
        session.shop,
        session.scope.as_deref().unwrap_or("-"),
    )
}
