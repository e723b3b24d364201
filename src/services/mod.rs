pub mod image_source;
pub mod ocr;
pub mod translation;

// Re-export commonly used services
pub use image_source::ImageFetcher;
pub use ocr::{OcrSpaceClient, RecognitionProvider};
pub use translation::{BlockTranslator, GoogleTranslateClient, TranslationProvider};
