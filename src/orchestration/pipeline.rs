// Page pipeline: recognize -> cluster -> translate

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::clustering::cluster_lines;
use crate::core::config::Config;
use crate::core::errors::{PipelineError, PipelineResult, Provider};
use crate::core::types::{ImagePayload, PageTranslation, RequestConfig};
use crate::services::ocr::{OcrSpaceClient, RecognitionProvider};
use crate::services::translation::{BlockTranslator, GoogleTranslateClient};
use crate::utils::Metrics;

/// Check a recognition key before any network call is made.
///
/// Missing, blank and placeholder ("Null") keys are rejected.
pub fn validate_api_key(key: Option<&str>) -> PipelineResult<&str> {
    let key = key.map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return Err(PipelineError::Configuration("no API key provided".to_string()));
    }
    if key.contains("Null") {
        return Err(PipelineError::Configuration(
            "API key is a placeholder".to_string(),
        ));
    }
    Ok(key)
}

/// Runs one page through recognition, clustering and translation
pub struct PageTranslator {
    recognizer: Arc<dyn RecognitionProvider>,
    translator: BlockTranslator,
    metrics: Option<Metrics>,
}

impl PageTranslator {
    pub fn new(
        recognizer: Arc<dyn RecognitionProvider>,
        translator: BlockTranslator,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            recognizer,
            translator,
            metrics,
        }
    }

    /// Wire the HTTP-backed providers from configuration
    pub fn from_config(config: Arc<Config>, metrics: Option<Metrics>) -> Result<Self> {
        let recognizer = Arc::new(OcrSpaceClient::new(config.clone(), metrics.clone())?);
        let provider = Arc::new(GoogleTranslateClient::new(config.clone(), metrics.clone())?);
        let translator = BlockTranslator::new(provider, config.pacing(), metrics.clone());

        info!(
            "✓ Pipeline ready (OCR engine {}, pacing {:?} + up to {:?})",
            config.ocr_engine(),
            config.pacing().base,
            config.pacing().jitter
        );

        Ok(Self::new(recognizer, translator, metrics))
    }

    /// Translate a single page image.
    ///
    /// # Errors
    /// - `Configuration` when the request carries no usable API key
    /// - recognition failures mapped from the provider
    /// - `NoTextDetected` when clustering yields no blocks
    /// - `RateLimited` when the batch translation call was rate limited
    #[instrument(
        skip(self, image, request),
        fields(
            bytes = image.bytes.len(),
            target = request.target_language.provider_code()
        )
    )]
    pub async fn translate_page(
        &self,
        image: &ImagePayload,
        request: &RequestConfig,
    ) -> PipelineResult<PageTranslation> {
        let start = Instant::now();
        let result = self.run(image, request).await;

        if let Some(ref m) = self.metrics {
            match &result {
                Ok(page) => m.record_page(page.blocks.len(), start.elapsed()),
                Err(e) => m.record_page_failure(matches!(e, PipelineError::NoTextDetected)),
            }
        }

        match &result {
            Ok(page) => info!(
                "✓ Page translated: {} blocks, outcome {:?}, {:.2}ms",
                page.blocks.len(),
                page.outcome,
                start.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => warn!("Page translation failed ({}): {}", e.kind(), e),
        }

        result
    }

    async fn run(
        &self,
        image: &ImagePayload,
        request: &RequestConfig,
    ) -> PipelineResult<PageTranslation> {
        let api_key = validate_api_key(request.api_key.as_deref())?;

        let lines = self
            .recognizer
            .recognize(image, api_key)
            .await
            .map_err(|e| PipelineError::from_provider(Provider::Recognition, e))?;

        let blocks = cluster_lines(&lines, image.width.map(f64::from));
        if blocks.is_empty() {
            return Err(PipelineError::NoTextDetected);
        }

        self.translator
            .translate_blocks(blocks, request.target_language)
            .await
    }
}
