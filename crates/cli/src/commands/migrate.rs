//! Database migration command.
//!
//! Migrations live in `crates/app/migrations/` and are embedded at compile
//! time; they are never run by the server on startup.

use sqlx::migrate::MigrateError;
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Run the app's database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../app/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
