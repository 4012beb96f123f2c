use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A band entry from the reference dataset (name, reference-site id, genre).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandReference {
    pub name: String,
    pub external_id: i64,
    pub genre: Option<String>,
}

/// A band owned by the primary store. Only `id` and `name` are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub genre: Option<String>,
}

impl BandRecord {
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            photo_path: None,
            genre: None,
        }
    }
}

/// Fields written back to the primary store for one enriched band.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandEnrichment {
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub genre: Option<String>,
}
