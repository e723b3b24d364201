pub mod batch;
pub mod client;

pub use batch::{BlockTranslator, BATCH_SEPARATOR, RATE_LIMIT_MARKER};
pub use client::{GoogleTranslateClient, TranslationProvider};
