//! # Store Migrations
//!
//! Embedded SQL migrations for the local store.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence
//!    number, named `NNNN_description.sql`
//! 2. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 3. NEVER modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The `sqlx::migrate!()` macro embeds the SQL files into the binary at
/// compile time; no runtime file access is needed on the terminal.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations.
///
/// Idempotent and ordered: each migration runs once, in filename order,
/// inside its own transaction, tracked in `_sqlx_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns (total_migrations, applied_migrations) for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
