//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! farm-village-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FARM_VILLAGE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL`
//!   connection string

use sqlx::PgPool;

use super::CommandError;

/// Run the server's database migrations.
///
/// Migrations are embedded at compile time from `crates/server/migrations/`.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
