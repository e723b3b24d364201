// Main entry point for the manga page translation service

use manga_translator::{
    core::{Config, PipelineError, Provider, RequestConfig},
    orchestration::{
        http::{bad_request, page_success, pipeline_failure, with_default_key},
        PageTranslator,
    },
    services::ImageFetcher,
    utils::{probe_image_async, Metrics},
};

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pipeline: Arc<PageTranslator>,
    fetcher: Arc<ImageFetcher>,
    metrics: Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().context("Failed to load configuration")?);

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "manga_translator={},tower_http=warn",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== MANGA PAGE TRANSLATOR ===");
    info!(
        "Config: OCR engine={} timeout={:?} default key={}",
        config.ocr_engine(),
        config.timeout(),
        if config.default_ocr_api_key().is_some() { "SET" } else { "NONE" }
    );

    // Initialize metrics
    let metrics = Metrics::new();

    let pipeline = Arc::new(PageTranslator::from_config(
        config.clone(),
        Some(metrics.clone()),
    )?);
    let fetcher = Arc::new(ImageFetcher::new(config.clone(), Some(metrics.clone()))?);

    let state = AppState {
        config: config.clone(),
        pipeline,
        fetcher,
        metrics,
    };

    // Setup CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/stats", get(stats_endpoint))
        .route("/process", post(process_image))
        .route("/process-url", post(process_url))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(cors);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(70));
    info!("Server starting on http://{}", addr);
    info!("{}", "-".repeat(70));
    info!("Endpoints:");
    info!("  GET  /             - Root endpoint");
    info!("  GET  /health       - Health check");
    info!("  GET  /metrics      - Prometheus metrics");
    info!("  GET  /stats        - Detailed statistics");
    info!("  POST /process      - Translate an uploaded page (multipart/form-data)");
    info!("  POST /process-url  - Translate a page by image URL (JSON)");
    info!("{}", "=".repeat(70));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Manga Page Translator"
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Detailed statistics endpoint (JSON)
async fn stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.metrics.snapshot();
    serde_json::to_value(snapshot).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize metrics: {}", e),
        )
    })
}

/// Decode, translate and render the response for one page
async fn translate_bytes(state: &AppState, bytes: Vec<u8>, request: RequestConfig) -> Response {
    let start_time = std::time::Instant::now();

    let image = match probe_image_async(bytes).await {
        Ok(image) => image,
        Err(e) => return bad_request(format!("Invalid image: {:#}", e)),
    };

    let request = with_default_key(request, state.config.default_ocr_api_key());

    match state.pipeline.translate_page(&image, &request).await {
        Ok(page) => {
            info!(
                "Request completed in {:.2}s: {} blocks, {} untranslated",
                start_time.elapsed().as_secs_f64(),
                page.blocks.len(),
                page.untranslated_count()
            );
            page_success(&page)
        }
        Err(e) => {
            error!("Page processing failed: {:?}", e);
            pipeline_failure(&e)
        }
    }
}

/// Translate an uploaded page
///
/// # Request Format:
/// - multipart/form-data
/// - Field "image": the page image (PNG/JPEG/WebP)
/// - Field "config" (optional): JSON `{"tgtLang": "eng", "apikey": "..."}`
async fn process_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    info!("Received process request");

    let mut image_bytes = None;
    let mut request = RequestConfig::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Multipart error: {}", e)),
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => match field.bytes().await {
                Ok(data) => image_bytes = Some(data.to_vec()),
                Err(e) => return bad_request(format!("Read error: {}", e)),
            },
            "config" => {
                let config_data = match field.text().await {
                    Ok(text) => text,
                    Err(e) => return bad_request(format!("Config read error: {}", e)),
                };
                request = match serde_json::from_str(&config_data) {
                    Ok(parsed) => parsed,
                    Err(e) => return bad_request(format!("Invalid config JSON: {}", e)),
                };
            }
            _ => {}
        }
    }

    let Some(bytes) = image_bytes else {
        return bad_request("No image provided".to_string());
    };

    translate_bytes(&state, bytes, request).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessUrlRequest {
    image_url: String,
    #[serde(default)]
    config: RequestConfig,
}

/// Translate a page referenced by URL
async fn process_url(
    State(state): State<AppState>,
    Json(body): Json<ProcessUrlRequest>,
) -> Response {
    info!("Received process-url request");

    let bytes = match state.fetcher.fetch(&body.image_url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = PipelineError::from_provider(Provider::ImageSource, e);
            error!("Image fetch failed: {:?}", err);
            return pipeline_failure(&err);
        }
    };

    translate_bytes(&state, bytes, body.config).await
}
