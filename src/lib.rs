// Library exports for the manga page translation workflow
//
// Recognized lines are clustered into text blocks, which are translated in a
// single batch request with a paced per-block fallback.

pub mod clustering;
pub mod core;
pub mod orchestration;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use core::{
    config::Config,
    errors::{ConfigError, PipelineError, Provider, ProviderError},
    types::{
        BlockBox, ImagePayload, PageTranslation, RecognizedLine, RequestConfig, TargetLanguage,
        TextBlock, TranslationOutcome, TranslationStatus,
    },
};

pub use clustering::cluster_lines;

pub use orchestration::PageTranslator;

pub use services::{
    BlockTranslator, GoogleTranslateClient, ImageFetcher, OcrSpaceClient, RecognitionProvider,
    TranslationProvider,
};

pub use utils::{probe_image_async, Metrics};
