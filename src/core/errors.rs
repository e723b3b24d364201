// Error types for the page translation pipeline
//
// Provider clients classify failures from HTTP status codes into ProviderError;
// the pipeline lifts them into PipelineError, which carries the stage and a
// user-facing message per kind.

use thiserror::Error;

/// Which external service produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Recognition,
    Translation,
    ImageSource,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Recognition => "ocr",
            Provider::Translation => "translate",
            Provider::ImageSource => "image",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("access denied (HTTP 403)")]
    AccessDenied,

    #[error("too many requests (HTTP 429)")]
    RateLimited,

    #[error("provider could not process the request: {0}")]
    Processing(String),

    #[error("request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
}

impl ProviderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            403 => ProviderError::AccessDenied,
            429 => ProviderError::RateLimited,
            _ => ProviderError::Transport {
                status: Some(status),
                message: format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>()),
            },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        match e.status().map(|s| s.as_u16()) {
            Some(403) => ProviderError::AccessDenied,
            Some(429) => ProviderError::RateLimited,
            status => ProviderError::Transport {
                status,
                message: e.to_string(),
            },
        }
    }
}

/// Terminal failure of one page translation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{provider} provider denied access")]
    AccessDenied { provider: Provider },

    #[error("{provider} provider is rate limiting requests")]
    RateLimited { provider: Provider },

    #[error("{provider} provider failed to process the request: {message}")]
    ProviderProcessing { provider: Provider, message: String },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    #[error("no text detected in image")]
    NoTextDetected,
}

impl PipelineError {
    pub fn from_provider(provider: Provider, err: ProviderError) -> Self {
        match err {
            ProviderError::AccessDenied => PipelineError::AccessDenied { provider },
            ProviderError::RateLimited => PipelineError::RateLimited { provider },
            ProviderError::Processing(message) => {
                PipelineError::ProviderProcessing { provider, message }
            }
            transport @ ProviderError::Transport { .. } => PipelineError::Transport {
                provider,
                source: transport,
            },
        }
    }

    /// Stable machine-readable kind, used in HTTP responses and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Configuration(_) => "configuration",
            PipelineError::AccessDenied { .. } => "access_denied",
            PipelineError::RateLimited { .. } => "rate_limited",
            PipelineError::ProviderProcessing { .. } => "provider_processing",
            PipelineError::Transport { .. } => "transport",
            PipelineError::NoTextDetected => "no_text_detected",
        }
    }

    /// Short message telling the user what to do next
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Configuration(detail) => {
                format!(
                    "OCR API key is missing or invalid ({}). Enter a valid key and retry.",
                    detail
                )
            }
            PipelineError::AccessDenied {
                provider: Provider::Recognition,
            } => {
                "OCR service rejected the API key (403). Check the key or its quota.".to_string()
            }
            PipelineError::AccessDenied {
                provider: Provider::ImageSource,
            } => "Image host denied the download (403). Use manual scan on this page instead."
                .to_string(),
            PipelineError::AccessDenied { provider } => {
                format!("{} service denied access (403).", provider)
            }
            PipelineError::RateLimited {
                provider: Provider::Translation,
            } => "Translation service is busy (429). Wait about 10 minutes before trying again."
                .to_string(),
            PipelineError::RateLimited { provider } => {
                format!(
                    "{} service is rate limiting requests (429). Wait a while and retry.",
                    provider
                )
            }
            PipelineError::ProviderProcessing { message, .. } => {
                format!("OCR could not process the image: {}", message)
            }
            PipelineError::Transport { provider, source } => {
                format!("Could not reach the {} service: {}", provider, source)
            }
            PipelineError::NoTextDetected => "No text detected in the image.".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server config: {0}")]
    InvalidServerConfig(String),

    #[error("Invalid endpoint URL for {name}: {value}")]
    InvalidEndpoint { name: &'static str, value: String },

    #[error("OCR engine must be 1, 2 or 3, got {0}")]
    InvalidOcrEngine(u8),

    #[error("Timeout must be > 0 seconds")]
    InvalidTimeout,

    #[error("Environment variable parsing failed: {0}")]
    EnvVarError(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
