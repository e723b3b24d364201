use anyhow::{Context, Result};
use image::ImageFormat;

use crate::core::types::ImagePayload;

/// Decode an uploaded image off the async runtime to learn its format and size.
///
/// The bytes themselves are forwarded untouched to the recognition provider;
/// decoding only validates the upload and supplies the page width used for
/// lines without word boxes.
pub async fn probe_image_async(bytes: Vec<u8>) -> Result<ImagePayload> {
    tokio::task::spawn_blocking(move || probe_image(bytes))
        .await
        .context("Failed to spawn blocking task for image probing")?
}

/// Synchronous version of probe_image_async for callers already off the runtime
pub fn probe_image(bytes: Vec<u8>) -> Result<ImagePayload> {
    let format = image::guess_format(&bytes).context("Unrecognized image format")?;
    let mime_type = mime_for(format);

    let img = image::load_from_memory_with_format(&bytes, format)
        .context("Failed to decode image")?;
    let (width, height) = (img.width(), img.height());

    Ok(ImagePayload::new(bytes)
        .with_mime_type(mime_type)
        .with_dimensions(width, height))
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        other => other.to_mime_type(),
    }
}
