//! Embedded schema migrations
//!
//! SQL files under `migrations/` are compiled into the binary and tracked in
//! the `_sqlx_migrations` table.

use sqlx::migrate::{MigrateError, Migrator};
use tracing::{info, instrument};

use super::DbPool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    info!("Running database migrations ({} embedded)", MIGRATOR.iter().count());
    MIGRATOR.run(pool.get_pool()).await?;
    info!("Database migrations complete");
    Ok(())
}
