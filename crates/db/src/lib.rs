//! Postgres access for the TigerSafe directory and announcement records.
//!
//! Models live in [`models`], query code in [`repositories`]. The
//! notification engine only reads through these; writes happen upstream.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Postgres channel the `announcements` insert trigger notifies on.
/// Must match `20260301000003_announcement_created_notify.sql`.
pub const ANNOUNCEMENT_CREATED_CHANNEL: &str = "announcement_created";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::debug!("Embedded migrations up to date");
    Ok(())
}
