//! Database migration command.
//!
//! ```bash
//! bs-cli migrate
//! ```
//!
//! Applies `crates/storefront/migrations/` to the database named by
//! `BURGERSHOP_DATABASE_URL` (or `DATABASE_URL`). The storefront never
//! migrates on startup.

use burgershop_storefront::db;
use thiserror::Error;

use super::{CommandError, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the storefront migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable, or a
/// migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
