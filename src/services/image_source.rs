// Remote image download for pages referenced by URL

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::core::config::Config;
use crate::core::errors::{ProviderError, ProviderResult};
use crate::utils::Metrics;

/// Fetches page images over HTTP
pub struct ImageFetcher {
    http_client: reqwest::Client,
    max_bytes: usize,
    metrics: Option<Metrics>,
}

impl ImageFetcher {
    pub fn new(config: Arc<Config>, metrics: Option<Metrics>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            max_bytes: config.max_upload_bytes(),
            metrics,
        })
    }

    /// Download the raw image bytes.
    ///
    /// A 403 from the host maps to `AccessDenied` so callers can suggest a
    /// manual scan; hotlink-protected hosts are the usual cause.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> ProviderResult<Vec<u8>> {
        let url = reqwest::Url::parse(url).map_err(|e| ProviderError::Transport {
            status: None,
            message: format!("invalid image URL: {}", e),
        })?;

        let start = Instant::now();
        let result = self.download(url).await;

        if let Some(ref m) = self.metrics {
            m.record_provider_call("image", result.is_ok(), start.elapsed());
        }

        match &result {
            Ok(bytes) => debug!("Fetched {} bytes in {:?}", bytes.len(), start.elapsed()),
            Err(e) => warn!("Image download failed: {}", e),
        }

        result
    }

    /// Override the download size limit
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    async fn download(&self, url: reqwest::Url) -> ProviderResult<Vec<u8>> {
        let mut response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(self.too_large(declared));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large((bytes.len() + chunk.len()) as u64));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }

    fn too_large(&self, size: u64) -> ProviderError {
        ProviderError::Transport {
            status: None,
            message: format!(
                "image exceeds the {} byte limit (got at least {} bytes)",
                self.max_bytes, size
            ),
        }
    }
}
