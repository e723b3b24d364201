pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::{Config, PacingConfig};
pub use errors::{ConfigError, PipelineError, Provider, ProviderError};
pub use types::{
    BlockBox, ImagePayload, LineMetrics, PageTranslation, RecognizedLine, RequestConfig,
    TargetLanguage, TextBlock, TranslationOutcome, TranslationStatus, WordBox,
};
