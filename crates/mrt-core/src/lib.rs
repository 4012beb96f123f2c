pub mod app_config;
pub mod bands;
pub mod catalog;
pub mod config;
pub mod sites;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use bands::{BandEnrichment, BandRecord, BandReference};
pub use catalog::{CatalogRecord, ListingItem, MediaType, ReleaseStatus};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_USER_AGENT};
pub use sites::{
    load_sites, parse_sites, Category, DetailRules, FieldSource, FormatPlacement, ListingRules,
    MediaRules, MediaToken, PageStrategy, PaginationRules, SiteRules, SitesFile, StructuredField,
    TitleRules, Transport,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("invalid site configuration: {0}")]
    Validation(String),
}
