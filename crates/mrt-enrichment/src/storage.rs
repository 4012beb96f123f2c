//! S3-compatible object storage (MinIO) through the AWS SDK.
//!
//! Buckets are addressed path-style (`{endpoint}/{bucket}/{key}`), which
//! MinIO requires. Checksums are only sent when an operation demands them,
//! since older MinIO releases reject the SDK's trailing-checksum uploads.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use crate::error::EnrichmentError;
use crate::ports::ContentStore;

const CREDENTIALS_PROVIDER: &str = "mrt-enrichment";

/// Connection settings for [`S3ContentStore`].
#[derive(Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"[redacted]")
            .finish()
    }
}

pub struct S3ContentStore {
    client: S3Client,
    bucket: String,
}

impl S3ContentStore {
    /// Builds an S3 client for `settings` with a per-operation timeout.
    ///
    /// No request is sent until the first [`ContentStore::put`].
    pub async fn connect(settings: S3Settings, timeout_secs: u64) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(Credentials::new(
                &settings.access_key,
                &settings.secret_key,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(timeout_secs))
                    .build(),
            )
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&shared)
            .endpoint_url(settings.endpoint.trim_end_matches('/'))
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self {
            client: S3Client::from_conf(config),
            bucket: settings.bucket,
        }
    }
}

#[async_trait]
impl ContentStore for S3ContentStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, EnrichmentError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let reason = match e.raw_response() {
                    Some(raw) => format!(
                        "HTTP {}: {}",
                        raw.status().as_u16(),
                        DisplayErrorContext(&e)
                    ),
                    None => DisplayErrorContext(&e).to_string(),
                };
                EnrichmentError::Upload {
                    key: key.to_owned(),
                    reason,
                }
            })?;

        tracing::debug!(key, bucket = %self.bucket, "object stored");
        Ok(key.to_owned())
    }
}
