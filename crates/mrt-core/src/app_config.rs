use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub sites_path: PathBuf,
    /// Primary store holding `Bands`.
    pub core_database_url: Option<String>,
    /// Reference store holding `BandReferences` and scraped catalog records.
    pub catalog_database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub scraper_max_pages: usize,
    pub request_delay_min_ms: u64,
    pub request_delay_max_ms: u64,
    pub flaresolverr_url: String,
    pub flaresolverr_max_timeout_ms: u64,
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_region: String,
    pub minio_access_key: Option<String>,
    pub minio_secret_key: Option<String>,
    pub reference_site_base_url: String,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `CORE_DATABASE_URL` was not set.
    pub fn require_core_database_url(&self) -> Result<&str, ConfigError> {
        self.core_database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("CORE_DATABASE_URL".to_string()))
    }

    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `CATALOG_DATABASE_URL` was not set.
    pub fn require_catalog_database_url(&self) -> Result<&str, ConfigError> {
        self.catalog_database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("CATALOG_DATABASE_URL".to_string()))
    }

    /// Returns `(access_key, secret_key)` for the content store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` naming the first absent key.
    pub fn require_minio_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let access = self
            .minio_access_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("MINIO_ACCESS_KEY".to_string()))?;
        let secret = self
            .minio_secret_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("MINIO_SECRET_KEY".to_string()))?;
        Ok((access, secret))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("sites_path", &self.sites_path)
            .field(
                "core_database_url",
                &self.core_database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "catalog_database_url",
                &self.catalog_database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("scraper_max_pages", &self.scraper_max_pages)
            .field("request_delay_min_ms", &self.request_delay_min_ms)
            .field("request_delay_max_ms", &self.request_delay_max_ms)
            .field("flaresolverr_url", &self.flaresolverr_url)
            .field(
                "flaresolverr_max_timeout_ms",
                &self.flaresolverr_max_timeout_ms,
            )
            .field("minio_endpoint", &self.minio_endpoint)
            .field("minio_bucket", &self.minio_bucket)
            .field("minio_region", &self.minio_region)
            .field(
                "minio_access_key",
                &self.minio_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "minio_secret_key",
                &self.minio_secret_key.as_ref().map(|_| "[redacted]"),
            )
            .field("reference_site_base_url", &self.reference_site_base_url)
            .finish()
    }
}
