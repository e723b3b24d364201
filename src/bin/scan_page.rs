//! Translate one page image from disk and print its text blocks
//! Run with: cargo run --release --bin scan_page -- <image_path> [eng|idn]

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use manga_translator::{
    probe_image_async, Config, PageTranslator, RequestConfig, TargetLanguage, TranslationStatus,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("manga_translator=info")
        .with_target(false)
        .init();

    // Get image path and optional language from args
    let args: Vec<String> = std::env::args().collect();
    let Some(sample_path) = args.get(1) else {
        bail!("usage: scan_page <image_path> [eng|idn]");
    };
    let language = args
        .get(2)
        .cloned()
        .or_else(|| std::env::var("TARGET_LANG").ok())
        .map(|code| TargetLanguage::from_config_code(&code))
        .unwrap_or_default();

    if !Path::new(sample_path).exists() {
        bail!("Image not found: {}", sample_path);
    }

    let config = Arc::new(Config::new().context("Failed to load configuration")?);
    let api_key = config
        .default_ocr_api_key()
        .context("OCR_API_KEY is not set")?
        .to_string();

    info!("Loading image: {}", sample_path);
    let bytes = tokio::fs::read(sample_path)
        .await
        .with_context(|| format!("Failed to read {}", sample_path))?;
    let image = probe_image_async(bytes).await?;
    info!(
        "Image: {}x{} ({})",
        image.width.unwrap_or(0),
        image.height.unwrap_or(0),
        image.mime_type
    );

    let pipeline = PageTranslator::from_config(config, None)?;
    let request = RequestConfig::new(language, api_key);

    let page = match pipeline.translate_page(&image, &request).await {
        Ok(page) => page,
        Err(e) => bail!("{}", e.user_message()),
    };

    println!("\n=== Results ({:?}) ===", page.outcome);
    for (i, block) in page.blocks.iter().enumerate() {
        let translated = match block.status {
            TranslationStatus::Pending => "(not translated)",
            _ => block.translated_text.as_deref().unwrap_or(""),
        };
        println!(
            "  {}. [{:.0},{:.0} {:.0}x{:.0}] {}",
            i + 1,
            block.bbox.x,
            block.bbox.y,
            block.bbox.w,
            block.bbox.h,
            block.original_text
        );
        println!("     -> {}", translated);
    }

    Ok(())
}
