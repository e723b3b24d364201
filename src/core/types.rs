// Shared data types for the page translation workflow

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Word-level box reported by the recognition provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Line-level metrics, only meaningful when a line carries no word boxes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineMetrics {
    pub min_top: f64,
    pub max_height: f64,
}

/// One line of recognized text as returned by the recognition provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    pub text: String,
    pub words: Vec<WordBox>,
    pub metrics: Option<LineMetrics>,
}

/// Union bounding box of a text block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Translation state of a single block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    /// No translation was attempted (fallback stopped before this block)
    Pending,
    Translated,
    /// Original text substituted after a failed or missing translation
    Untranslated,
    /// Provider rate limited the call for this block
    RateLimited,
}

/// Finalized text block: merged text of one cluster plus its union box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub original_text: String,
    #[serde(rename = "box")]
    pub bbox: BlockBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    pub status: TranslationStatus,
}

impl TextBlock {
    pub fn new(original_text: String, bbox: BlockBox) -> Self {
        Self {
            original_text,
            bbox,
            translated_text: None,
            status: TranslationStatus::Pending,
        }
    }

    pub fn with_translation(mut self, translated: String, status: TranslationStatus) -> Self {
        self.translated_text = Some(translated);
        self.status = status;
        self
    }
}

/// How the translation stage finished for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// Single batch request succeeded
    Complete,
    /// Batch failed, sequential fallback visited every block
    Degraded,
    /// Sequential fallback stopped on a rate limit; trailing blocks are pending
    Partial,
}

/// Translated page: blocks in cluster emission order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTranslation {
    pub outcome: TranslationOutcome,
    pub blocks: Vec<TextBlock>,
}

impl PageTranslation {
    pub fn untranslated_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.status != TranslationStatus::Translated)
            .count()
    }
}

/// Target language for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetLanguage {
    English,
    #[default]
    Indonesian,
}

impl TargetLanguage {
    /// Parse a configuration code; anything unrecognized maps to Indonesian
    pub fn from_config_code(code: &str) -> Self {
        match code {
            "eng" => TargetLanguage::English,
            _ => TargetLanguage::Indonesian,
        }
    }

    pub fn config_code(&self) -> &'static str {
        match self {
            TargetLanguage::English => "eng",
            TargetLanguage::Indonesian => "idn",
        }
    }

    /// Language code sent to the translation provider
    pub fn provider_code(&self) -> &'static str {
        match self {
            TargetLanguage::English => "en",
            TargetLanguage::Indonesian => "id",
        }
    }
}

impl From<String> for TargetLanguage {
    fn from(code: String) -> Self {
        Self::from_config_code(&code)
    }
}

impl From<TargetLanguage> for String {
    fn from(lang: TargetLanguage) -> Self {
        lang.config_code().to_string()
    }
}

/// Immutable per-request configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(rename = "tgtLang", default)]
    pub target_language: TargetLanguage,
    #[serde(rename = "apikey", default)]
    pub api_key: Option<String>,
}

impl RequestConfig {
    pub fn new(target_language: TargetLanguage, api_key: impl Into<String>) -> Self {
        Self {
            target_language,
            api_key: Some(api_key.into()),
        }
    }
}

/// Image bytes plus dimensions when they could be decoded
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: &'static str,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            mime_type: "image/jpeg",
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_language_codes() {
        assert_eq!(TargetLanguage::from_config_code("eng").provider_code(), "en");
        assert_eq!(TargetLanguage::from_config_code("idn").provider_code(), "id");
        assert_eq!(TargetLanguage::from_config_code("klingon"), TargetLanguage::Indonesian);
    }

    #[test]
    fn test_only_exact_eng_selects_english() {
        for code in ["en", "ENG", " eng ", "english", ""] {
            assert_eq!(
                TargetLanguage::from_config_code(code).provider_code(),
                "id",
                "code {:?}",
                code
            );
        }
    }

    #[test]
    fn test_request_config_deserialize() {
        let config: RequestConfig =
            serde_json::from_str(r#"{"tgtLang": "eng", "apikey": "K123"}"#).unwrap();
        assert_eq!(config.target_language, TargetLanguage::English);
        assert_eq!(config.api_key.as_deref(), Some("K123"));

        let defaults: RequestConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.target_language, TargetLanguage::Indonesian);
        assert!(defaults.api_key.is_none());
    }

    #[test]
    fn test_text_block_serializes_box_field() {
        let block = TextBlock::new(
            "hello".into(),
            BlockBox { x: 1.0, y: 2.0, w: 3.0, h: 4.0 },
        );
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["originalText"], "hello");
        assert_eq!(json["box"]["w"], 3.0);
        assert!(json.get("translatedText").is_none());
        assert_eq!(json["status"], "pending");
    }
}
