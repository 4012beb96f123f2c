//! Database operations for the primary store's `"Bands"` table.
//!
//! The table is owned by the main application, so column names keep its
//! quoted PascalCase and nothing here creates or migrates it.

use mrt_core::{BandEnrichment, BandRecord};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// The two columns of `"Bands"` the enrichment run reads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BandRow {
    #[sqlx(rename = "Id")]
    pub id: Uuid,
    #[sqlx(rename = "Name")]
    pub name: String,
}

impl From<BandRow> for BandRecord {
    fn from(row: BandRow) -> Self {
        BandRecord::new(row.id, row.name)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every band in the primary store, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_bands(pool: &PgPool) -> Result<Vec<BandRow>, DbError> {
    let rows = sqlx::query_as::<_, BandRow>(
        "SELECT \"Id\", \"Name\" \
         FROM \"Bands\" \
         ORDER BY \"Name\"",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Writes description, photo path and genre for one band.
///
/// `None` fields are written as `NULL`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no band has the given id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_band_enrichment(
    pool: &PgPool,
    id: Uuid,
    enrichment: &BandEnrichment,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE \"Bands\" \
         SET \"Description\" = $1, \"PhotoUrl\" = $2, \"Genre\" = $3 \
         WHERE \"Id\" = $4",
    )
    .bind(enrichment.description.as_deref())
    .bind(enrichment.photo_path.as_deref())
    .bind(enrichment.genre.as_deref())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
