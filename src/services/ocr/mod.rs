// Recognition provider: OCR.space compatible HTTP API
//
// Sends the page as a base64 data URI and asks for the text overlay, which
// carries per-line and per-word boxes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::core::config::Config;
use crate::core::errors::{ProviderError, ProviderResult};
use crate::core::types::{ImagePayload, LineMetrics, RecognizedLine, WordBox};
use crate::utils::Metrics;

/// Source of recognized lines for an image
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Recognize text lines with their boxes, in provider order
    async fn recognize(
        &self,
        image: &ImagePayload,
        api_key: &str,
    ) -> ProviderResult<Vec<RecognizedLine>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    text_overlay: Option<TextOverlay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextOverlay {
    #[serde(default)]
    lines: Vec<OverlayLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OverlayLine {
    #[serde(default)]
    line_text: String,
    #[serde(default)]
    words: Vec<OverlayWord>,
    #[serde(default)]
    max_height: Option<f64>,
    #[serde(default)]
    min_top: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OverlayWord {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl From<OverlayLine> for RecognizedLine {
    fn from(line: OverlayLine) -> Self {
        let metrics = match (line.min_top, line.max_height) {
            (None, None) => None,
            (min_top, max_height) => Some(LineMetrics {
                min_top: min_top.unwrap_or(0.0),
                max_height: max_height.unwrap_or(0.0),
            }),
        };
        RecognizedLine {
            text: line.line_text,
            words: line
                .words
                .into_iter()
                .map(|w| WordBox {
                    left: w.left,
                    top: w.top,
                    width: w.width,
                    height: w.height,
                })
                .collect(),
            metrics,
        }
    }
}

/// `ErrorMessage` comes back either as a string or as a list of strings
fn error_message_text(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            if joined.is_empty() {
                "OCR failed to process the image".to_string()
            } else {
                joined
            }
        }
        _ => "OCR failed to process the image".to_string(),
    }
}

/// Decode a provider response body into recognized lines
fn parse_response(body: &str) -> ProviderResult<Vec<RecognizedLine>> {
    let response: OcrResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Processing(format!("Invalid OCR response: {}", e)))?;

    if response.is_errored_on_processing {
        return Err(ProviderError::Processing(error_message_text(
            response.error_message,
        )));
    }

    let lines = response
        .parsed_results
        .into_iter()
        .next()
        .and_then(|r| r.text_overlay)
        .map(|overlay| overlay.lines.into_iter().map(RecognizedLine::from).collect())
        .unwrap_or_default();

    Ok(lines)
}

/// OCR.space client
pub struct OcrSpaceClient {
    http_client: reqwest::Client,
    endpoint: String,
    engine: u8,
    metrics: Option<Metrics>,
}

impl OcrSpaceClient {
    pub fn new(config: Arc<Config>, metrics: Option<Metrics>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            endpoint: config.ocr_endpoint().to_string(),
            engine: config.ocr_engine(),
            metrics,
        })
    }

    async fn send(&self, image: &ImagePayload, api_key: &str) -> ProviderResult<String> {
        let data_uri = format!(
            "data:{};base64,{}",
            image.mime_type,
            general_purpose::STANDARD.encode(image.bytes.as_slice())
        );

        let form = reqwest::multipart::Form::new()
            .text("base64Image", data_uri)
            .text("language", "auto")
            .text("isOverlayRequired", "true")
            .text("apikey", api_key.to_string())
            .text("OCREngine", self.engine.to_string());

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl RecognitionProvider for OcrSpaceClient {
    #[instrument(skip(self, image, api_key), fields(bytes = image.bytes.len()))]
    async fn recognize(
        &self,
        image: &ImagePayload,
        api_key: &str,
    ) -> ProviderResult<Vec<RecognizedLine>> {
        let start = Instant::now();
        let result = match self.send(image, api_key).await {
            Ok(body) => parse_response(&body),
            Err(e) => Err(e),
        };

        if let Some(ref m) = self.metrics {
            m.record_provider_call("ocr", result.is_ok(), start.elapsed());
            if result.as_ref().is_err_and(ProviderError::is_rate_limited) {
                m.record_rate_limit("ocr");
            }
        }

        match &result {
            Ok(lines) => debug!("OCR returned {} lines in {:?}", lines.len(), start.elapsed()),
            Err(e) => warn!("OCR request failed: {}", e),
        }

        result
    }
}
