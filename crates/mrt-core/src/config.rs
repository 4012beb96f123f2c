use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser user agent sent by default; several shops reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("MRT_ENV", "development"))?;
    let log_level = or_default("MRT_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("MRT_SITES_PATH", "./config/sites.yaml"));

    let core_database_url = optional("CORE_DATABASE_URL");
    let catalog_database_url = optional("CATALOG_DATABASE_URL");

    let db_max_connections = parse_u32("MRT_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("MRT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MRT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("MRT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("MRT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_retries = parse_u32("MRT_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs = parse_u64("MRT_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;
    let scraper_max_pages = parse_usize("MRT_SCRAPER_MAX_PAGES", "200")?;

    let request_delay_min_ms = parse_u64("MRT_REQUEST_DELAY_MIN_MS", "2000")?;
    let request_delay_max_ms = parse_u64("MRT_REQUEST_DELAY_MAX_MS", "3000")?;
    if request_delay_min_ms > request_delay_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "MRT_REQUEST_DELAY_MIN_MS".to_string(),
            reason: format!(
                "{request_delay_min_ms} exceeds MRT_REQUEST_DELAY_MAX_MS ({request_delay_max_ms})"
            ),
        });
    }

    let flaresolverr_url = or_default("FLARESOLVERR_URL", "http://localhost:8191/v1");
    let flaresolverr_max_timeout_ms = parse_u64("FLARESOLVERR_MAX_TIMEOUT_MS", "60000")?;

    let minio_endpoint = or_default("MINIO_ENDPOINT", "http://localhost:9001");
    let minio_bucket = or_default("MINIO_BUCKET", "metal-release-tracker");
    let minio_region = or_default("MINIO_REGION", "us-east-1");
    let minio_access_key = optional("MINIO_ACCESS_KEY");
    let minio_secret_key = optional("MINIO_SECRET_KEY");

    let reference_site_base_url =
        or_default("REFERENCE_SITE_BASE_URL", "https://www.metal-archives.com");

    Ok(AppConfig {
        env,
        log_level,
        sites_path,
        core_database_url,
        catalog_database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_max_pages,
        request_delay_min_ms,
        request_delay_max_ms,
        flaresolverr_url,
        flaresolverr_max_timeout_ms,
        minio_endpoint,
        minio_bucket,
        minio_region,
        minio_access_key,
        minio_secret_key,
        reference_site_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MRT_ENV".to_string(),
            reason: format!("expected development|test|production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
