//! Read access to the `"BandReferences"` snapshot in the catalog store.

use mrt_core::BandReference;
use sqlx::PgPool;

use crate::DbError;

/// A row from `"BandReferences"`: one metal-archives entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BandReferenceRow {
    #[sqlx(rename = "BandName")]
    pub band_name: String,
    #[sqlx(rename = "MetalArchivesId")]
    pub metal_archives_id: i64,
    #[sqlx(rename = "Genre")]
    pub genre: Option<String>,
}

impl From<BandReferenceRow> for BandReference {
    fn from(row: BandReferenceRow) -> Self {
        BandReference {
            name: row.band_name,
            external_id: row.metal_archives_id,
            genre: row.genre,
        }
    }
}

/// Returns the full reference snapshot in table order.
///
/// Row order matters to the caller: when two entries normalize to the same
/// name, the later one wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_band_references(pool: &PgPool) -> Result<Vec<BandReferenceRow>, DbError> {
    let rows = sqlx::query_as::<_, BandReferenceRow>(
        "SELECT \"BandName\", \"MetalArchivesId\", \"Genre\" \
         FROM \"BandReferences\"",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
