use crate::core::errors::ConfigError;
use rand::Rng;
use std::env;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
    pub max_upload_mb: usize,
}

/// Provider endpoints and credentials
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Key used when a request does not bring its own
    pub default_ocr_api_key: Option<String>,
    pub ocr_endpoint: String,
    pub ocr_engine: u8,
    pub translate_endpoint: String,
    pub timeout_seconds: u64,
}

/// Pacing of the sequential translation fallback
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    pub base: Duration,
    pub jitter: Duration,
}

impl PacingConfig {
    /// Randomized delay in `[base, base + jitter]`
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base + Duration::from_millis(extra)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(2000),
            jitter: Duration::from_millis(1000),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProviderConfig,
    pub pacing: PacingConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        let ocr_engine = match env::var("OCR_ENGINE") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::EnvVarError(format!("OCR_ENGINE={}", raw)))?,
            Err(_) => 2,
        };

        Ok(Self {
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1420),
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                log_level,
                max_upload_mb: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            },
            providers: ProviderConfig {
                default_ocr_api_key: env::var("OCR_API_KEY")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                ocr_endpoint: env::var("OCR_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_OCR_ENDPOINT.to_string()),
                ocr_engine,
                translate_endpoint: env::var("TRANSLATE_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_TRANSLATE_ENDPOINT.to_string()),
                timeout_seconds: env::var("API_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            },
            pacing: PacingConfig {
                base: Duration::from_millis(
                    env::var("FALLBACK_PACING_BASE_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(2000),
                ),
                jitter: Duration::from_millis(
                    env::var("FALLBACK_PACING_JITTER_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1000),
                ),
            },
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "SERVER_PORT must be > 0".to_string(),
            ));
        }

        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "MAX_UPLOAD_MB must be > 0".to_string(),
            ));
        }

        for (name, value) in [
            ("OCR_ENDPOINT", &self.providers.ocr_endpoint),
            ("TRANSLATE_ENDPOINT", &self.providers.translate_endpoint),
        ] {
            if reqwest::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidEndpoint {
                    name,
                    value: value.clone(),
                });
            }
        }

        if !(1..=3).contains(&self.providers.ocr_engine) {
            return Err(ConfigError::InvalidOcrEngine(self.providers.ocr_engine));
        }

        if self.providers.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * 1024 * 1024
    }

    pub fn default_ocr_api_key(&self) -> Option<&str> {
        self.providers.default_ocr_api_key.as_deref()
    }

    pub fn ocr_endpoint(&self) -> &str {
        &self.providers.ocr_endpoint
    }

    pub fn ocr_engine(&self) -> u8 {
        self.providers.ocr_engine
    }

    pub fn translate_endpoint(&self) -> &str {
        &self.providers.translate_endpoint
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_seconds)
    }

    pub fn pacing(&self) -> PacingConfig {
        self.pacing
    }
}

impl Default for Config {
    /// Built-in defaults without reading the environment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 1420,
                host: "0.0.0.0".to_string(),
                log_level: Level::INFO,
                max_upload_mb: 20,
            },
            providers: ProviderConfig {
                default_ocr_api_key: None,
                ocr_endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
                ocr_engine: 2,
                translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
                timeout_seconds: 60,
            },
            pacing: PacingConfig::default(),
        }
    }
}
