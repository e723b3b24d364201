// Block translation: one combined request, sequential fallback on failure

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::client::TranslationProvider;
use crate::core::config::PacingConfig;
use crate::core::errors::{PipelineError, PipelineResult, Provider, ProviderError};
use crate::core::types::{
    PageTranslation, TargetLanguage, TextBlock, TranslationOutcome, TranslationStatus,
};
use crate::utils::Metrics;

/// Separator between block texts in a combined request
pub const BATCH_SEPARATOR: &str = "\n\n";

/// Text set on the block that hit the rate limit during fallback
pub const RATE_LIMIT_MARKER: &str = "⛔ Limit";

/// Translates finalized blocks, preferring a single batch request
pub struct BlockTranslator {
    provider: Arc<dyn TranslationProvider>,
    pacing: PacingConfig,
    metrics: Option<Metrics>,
}

impl BlockTranslator {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        pacing: PacingConfig,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            provider,
            pacing,
            metrics,
        }
    }

    /// Translate all blocks in one request; degrade to per-block requests
    /// when the batch call fails for any reason other than a rate limit.
    ///
    /// # Returns
    /// Blocks in input order with the outcome of the stage, or
    /// `PipelineError::RateLimited` when the batch call itself was rate limited.
    #[instrument(
        skip(self, blocks),
        fields(blocks = blocks.len(), target = target.provider_code())
    )]
    pub async fn translate_blocks(
        &self,
        blocks: Vec<TextBlock>,
        target: TargetLanguage,
    ) -> PipelineResult<PageTranslation> {
        if blocks.is_empty() {
            return Ok(PageTranslation {
                outcome: TranslationOutcome::Complete,
                blocks,
            });
        }

        let combined = blocks
            .iter()
            .map(|b| b.original_text.as_str())
            .collect::<Vec<_>>()
            .join(BATCH_SEPARATOR);

        let start = Instant::now();
        match self.provider.translate(&combined, target).await {
            Ok(translated) => {
                if let Some(ref m) = self.metrics {
                    m.record_batch_translation(true);
                }
                debug!(
                    "Batch translation of {} blocks finished in {:.2}ms",
                    blocks.len(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Ok(PageTranslation {
                    outcome: TranslationOutcome::Complete,
                    blocks: apply_segments(blocks, &translated),
                })
            }
            Err(ProviderError::RateLimited) => {
                if let Some(ref m) = self.metrics {
                    m.record_batch_translation(false);
                }
                warn!("Batch translation rate limited, not falling back");
                Err(PipelineError::RateLimited {
                    provider: Provider::Translation,
                })
            }
            Err(e) => {
                if let Some(ref m) = self.metrics {
                    m.record_batch_translation(false);
                }
                warn!("Batch translation failed ({}), falling back to sequential", e);
                Ok(self.translate_sequential(blocks, target).await)
            }
        }
    }

    /// Translate blocks one request at a time, pausing after each successful
    /// call except the last.
    ///
    /// A rate limit marks the current block and stops the loop; remaining
    /// blocks are returned untouched. Any other failure substitutes the
    /// block's original text and moves on.
    pub async fn translate_sequential(
        &self,
        blocks: Vec<TextBlock>,
        target: TargetLanguage,
    ) -> PageTranslation {
        if let Some(ref m) = self.metrics {
            m.record_fallback_run();
        }

        let total = blocks.len();
        let mut outcome = TranslationOutcome::Degraded;
        let mut translated = Vec::with_capacity(total);
        let mut remaining = blocks.into_iter();

        for position in 0..total {
            let Some(block) = remaining.next() else {
                break;
            };

            let result = self.provider.translate(&block.original_text, target).await;
            if let Some(ref m) = self.metrics {
                m.record_fallback_call(result.is_ok());
            }

            match result {
                Ok(text) => {
                    translated.push(block.with_translation(text, TranslationStatus::Translated));
                    if position + 1 < total {
                        tokio::time::sleep(self.pacing.next_delay()).await;
                    }
                }
                Err(ProviderError::RateLimited) => {
                    warn!(
                        "Rate limited on block {}/{}, stopping fallback",
                        position + 1,
                        total
                    );
                    translated.push(block.with_translation(
                        RATE_LIMIT_MARKER.to_string(),
                        TranslationStatus::RateLimited,
                    ));
                    outcome = TranslationOutcome::Partial;
                    break;
                }
                Err(e) => {
                    debug!("Block {} translation failed: {}", position + 1, e);
                    let original = block.original_text.clone();
                    translated.push(
                        block.with_translation(original, TranslationStatus::Untranslated),
                    );
                }
            }
        }

        translated.extend(remaining);

        info!(
            "Sequential fallback finished: {:?}, {}/{} blocks attempted",
            outcome,
            translated
                .iter()
                .filter(|b| b.status != TranslationStatus::Pending)
                .count(),
            total
        );

        PageTranslation {
            outcome,
            blocks: translated,
        }
    }
}

/// Assign split segments back to blocks by position
fn apply_segments(blocks: Vec<TextBlock>, combined: &str) -> Vec<TextBlock> {
    let mut segments = combined.split(BATCH_SEPARATOR);

    blocks
        .into_iter()
        .map(|block| match segments.next().map(str::trim) {
            Some(segment) if !segment.is_empty() => {
                let segment = segment.to_string();
                block.with_translation(segment, TranslationStatus::Translated)
            }
            _ => {
                let original = block.original_text.clone();
                block.with_translation(original, TranslationStatus::Untranslated)
            }
        })
        .collect()
}
