use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use crate::core::config::Config;
use crate::core::errors::{ProviderError, ProviderResult};
use crate::core::types::TargetLanguage;
use crate::utils::Metrics;

/// Text translation from an auto-detected source language
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, target: TargetLanguage) -> ProviderResult<String>;
}

/// Client for the Google `translate_a/single` endpoint
pub struct GoogleTranslateClient {
    http_client: reqwest::Client,
    endpoint: String,
    metrics: Option<Metrics>,
}

impl GoogleTranslateClient {
    pub fn new(config: Arc<Config>, metrics: Option<Metrics>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: config.translate_endpoint().to_string(),
            metrics,
        })
    }

    async fn send(&self, text: &str, target: TargetLanguage) -> ProviderResult<String> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.provider_code()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::Processing(format!("Invalid translation response: {}", e))
            })?;

        Ok(join_segments(&body).unwrap_or_else(|| text.to_string()))
    }
}

/// Concatenate translated segments from `body[0][i][0]`.
///
/// Returns `None` when the payload has no segment list.
pub fn join_segments(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    Some(
        segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
            .collect(),
    )
}

#[async_trait]
impl TranslationProvider for GoogleTranslateClient {
    #[instrument(skip(self, text), fields(chars = text.len(), target = target.provider_code()))]
    async fn translate(&self, text: &str, target: TargetLanguage) -> ProviderResult<String> {
        let clean = text.trim();
        if clean.is_empty() {
            return Ok(String::new());
        }

        let start = Instant::now();
        let result = self.send(clean, target).await;

        if let Some(ref m) = self.metrics {
            m.record_provider_call("translate", result.is_ok(), start.elapsed());
            if result.as_ref().is_err_and(ProviderError::is_rate_limited) {
                m.record_rate_limit("translate");
            }
        }

        debug!(
            "Translation request finished in {:.2}ms (ok: {})",
            start.elapsed().as_secs_f64() * 1000.0,
            result.is_ok()
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_segments() {
        let body = json!([
            [
                ["Halo, ", "Hello, ", null, null, 10],
                ["apa kabar?", "how are you?", null, null, 10],
                [null, null, "Halo"]
            ],
            null,
            "en"
        ]);
        assert_eq!(join_segments(&body).as_deref(), Some("Halo, apa kabar?"));
    }

    #[test]
    fn test_join_segments_missing_list() {
        assert!(join_segments(&json!(null)).is_none());
        assert!(join_segments(&json!([null, "en"])).is_none());
        assert_eq!(join_segments(&json!([[]])).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_blank_text_skips_network() {
        let mut config = Config::default();
        // Unroutable endpoint: any request would fail
        config.providers.translate_endpoint = "http://127.0.0.1:9/translate".to_string();
        let client = GoogleTranslateClient::new(Arc::new(config), None).unwrap();

        let result = client.translate("   \n", TargetLanguage::English).await.unwrap();
        assert_eq!(result, "");
    }
}
