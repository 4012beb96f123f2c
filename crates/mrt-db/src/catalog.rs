//! Database operations for the `catalog_records` table.

use chrono::{DateTime, Utc};
use mrt_core::{CatalogRecord, MediaType, ReleaseStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `catalog_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRecordRow {
    pub id: i64,
    pub site: String,
    pub source_url: String,
    pub band: String,
    pub album: String,
    pub media: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub label: Option<String>,
    pub genre: Option<String>,
    pub photo_url: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogRecordRow> for CatalogRecord {
    fn from(row: CatalogRecordRow) -> Self {
        CatalogRecord {
            site: row.site,
            source_url: row.source_url,
            band: row.band,
            album: row.album,
            media: MediaType::from_declared(&row.media).unwrap_or(MediaType::Unknown),
            sku: row.sku,
            price: row.price,
            currency: row.currency,
            label: row.label,
            genre: row.genre,
            photo_url: row.photo_url,
            release_date: row.release_date,
            description: row.description,
            status: row.status.as_deref().and_then(ReleaseStatus::from_label_text),
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a scraped record, or refreshes the existing row for the same
/// `(site, source_url)`.
///
/// `first_seen_at` is preserved across updates. Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_catalog_record(pool: &PgPool, record: &CatalogRecord) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO catalog_records \
             (site, source_url, band, album, media, sku, price, currency, label, genre, \
              photo_url, release_date, description, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (site, source_url) DO UPDATE SET \
             band = EXCLUDED.band, \
             album = EXCLUDED.album, \
             media = EXCLUDED.media, \
             sku = EXCLUDED.sku, \
             price = EXCLUDED.price, \
             currency = EXCLUDED.currency, \
             label = EXCLUDED.label, \
             genre = EXCLUDED.genre, \
             photo_url = EXCLUDED.photo_url, \
             release_date = EXCLUDED.release_date, \
             description = EXCLUDED.description, \
             status = EXCLUDED.status, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(&record.site)
    .bind(&record.source_url)
    .bind(&record.band)
    .bind(&record.album)
    .bind(record.media.to_string())
    .bind(record.sku.as_deref())
    .bind(record.price)
    .bind(record.currency.as_deref())
    .bind(record.label.as_deref())
    .bind(record.genre.as_deref())
    .bind(record.photo_url.as_deref())
    .bind(record.release_date.as_deref())
    .bind(record.description.as_deref())
    .bind(record.status.map(|s| s.to_string()))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns every stored record for a site, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_catalog_records(
    pool: &PgPool,
    site: &str,
) -> Result<Vec<CatalogRecordRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogRecordRow>(
        "SELECT id, site, source_url, band, album, media, sku, price, currency, label, genre, \
                photo_url, release_date, description, status, first_seen_at, updated_at \
         FROM catalog_records \
         WHERE site = $1 \
         ORDER BY updated_at DESC, id DESC",
    )
    .bind(site)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
