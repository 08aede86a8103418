//! Database schema migrations
//!
//! Versioned migrations tracked in the schema_version table, so databases
//! created by older builds upgrade in place without data loss.
//!
//! Guidelines:
//! 1. Never modify existing migrations - add a new one per schema change
//! 2. Prefer ALTER TABLE over DROP/CREATE to preserve data
//! 3. Migrations must be idempotent (safe to run multiple times)

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Current schema version
///
/// Increment this when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version >= CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    info!(
        "Migrating database schema from v{} to v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        // v1 is the baseline schema created by init_database; nothing to
        // transform, just record the version.
        set_schema_version(pool, 1).await?;
        info!("Migration v1: baseline schema recorded");
    }

    Ok(())
}
