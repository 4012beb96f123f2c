//! Postgres access for the two stores a run touches.
//!
//! The *core* store belongs to the main application and holds `"Bands"`.
//! The *catalog* store holds the `"BandReferences"` snapshot and the
//! scraped `catalog_records`; only its schema is migrated from here.

use std::time::Duration;

use mrt_core::{AppConfig, ConfigError};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

pub mod band_references;
pub mod bands;
pub mod catalog;

pub use band_references::{list_band_references, BandReferenceRow};
pub use bands::{list_bands, update_band_enrichment, BandRow};
pub use catalog::{list_catalog_records, upsert_catalog_record, CatalogRecordRow};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool sizing shared by both stores.
#[must_use]
pub fn pool_options(config: &AppConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
}

/// Opens the primary store (`CORE_DATABASE_URL`).
///
/// # Errors
///
/// Returns [`DbError::Config`] when the URL is not configured, before any
/// connection attempt, or [`DbError::Sqlx`] if connecting fails.
pub async fn connect_core(config: &AppConfig) -> Result<PgPool, DbError> {
    let url = config.require_core_database_url()?;
    Ok(pool_options(config).connect(url).await?)
}

/// Opens the catalog store (`CATALOG_DATABASE_URL`).
///
/// # Errors
///
/// Returns [`DbError::Config`] when the URL is not configured, before any
/// connection attempt, or [`DbError::Sqlx`] if connecting fails.
pub async fn connect_catalog(config: &AppConfig) -> Result<PgPool, DbError> {
    let url = config.require_catalog_database_url()?;
    Ok(pool_options(config).connect(url).await?)
}

/// Applies pending catalog migrations and returns how many ran.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if a migration fails, or
/// [`DbError::Sqlx`] if the migration ledger cannot be read.
pub async fn run_migrations(pool: &PgPool) -> Result<u64, DbError> {
    let before = applied_migrations(pool).await?;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await?;
    Ok(after.saturating_sub(before).unsigned_abs())
}

async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let ledger_exists: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if !ledger_exists {
        return Ok(0);
    }
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
}

/// Round-trips `SELECT 1`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
