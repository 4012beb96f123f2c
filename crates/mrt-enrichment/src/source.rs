use async_trait::async_trait;
use mrt_scraper::Fetch;

use crate::error::EnrichmentError;
use crate::ports::BandPageSource;

/// Band pages and photos from the reference site.
///
/// Pages always go through `proxy` (the site sits behind a bot challenge).
/// Photos are tried with `direct` first and fall back to `proxy`.
pub struct ReferenceSite<P, D> {
    base_url: String,
    proxy: P,
    direct: D,
}

impl<P: Fetch, D: Fetch> ReferenceSite<P, D> {
    pub fn new(base_url: &str, proxy: P, direct: D) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            proxy,
            direct,
        }
    }

    #[must_use]
    pub fn band_url(&self, external_id: i64) -> String {
        format!("{}/bands/_/{external_id}", self.base_url)
    }
}

#[async_trait]
impl<P: Fetch, D: Fetch> BandPageSource for ReferenceSite<P, D> {
    async fn band_page(&self, external_id: i64) -> Result<String, EnrichmentError> {
        let url = self.band_url(external_id);
        Ok(self.proxy.fetch_text(&url).await?)
    }

    async fn photo(&self, url: &str) -> Result<Vec<u8>, EnrichmentError> {
        match self.direct.fetch_bytes(url).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::info!(url, error = %e, "direct photo download failed, retrying through proxy");
                Ok(self.proxy.fetch_bytes(url).await?)
            }
        }
    }
}
