// Rectangle extraction from recognized lines

use tracing::debug;

use crate::core::types::{LineMetrics, RecognizedLine};

/// Width assigned to a line-level box when the page width is unknown
pub const PLACEHOLDER_LINE_WIDTH: f64 = 100.0;

/// Axis-aligned box of one recognized line
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub index: usize,
    pub source_text: String,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Rectangle {
    /// Build from origin and size; negative sizes clamp to zero
    pub fn new(
        index: usize,
        source_text: impl Into<String>,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            index,
            source_text: source_text.into(),
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
            center_x: left + width / 2.0,
            center_y: top + height / 2.0,
        }
    }
}

/// Convert recognized lines into rectangles, one per line, in input order.
///
/// Lines with word boxes use the word extents. Lines without word boxes fall
/// back to their line-level metrics: the box starts at the left page edge,
/// spans the page width (or `PLACEHOLDER_LINE_WIDTH` when the width is
/// unknown) and uses `min_top` / `max_height` vertically.
pub fn extract_rectangles(lines: &[RecognizedLine], page_width: Option<f64>) -> Vec<Rectangle> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| line_rectangle(index, line, page_width))
        .collect()
}

fn line_rectangle(index: usize, line: &RecognizedLine, page_width: Option<f64>) -> Rectangle {
    if line.words.is_empty() {
        let metrics = line.metrics.unwrap_or_default();
        let LineMetrics { min_top, max_height } = metrics;
        let width = page_width
            .filter(|w| *w > 0.0)
            .unwrap_or(PLACEHOLDER_LINE_WIDTH);
        debug!(
            "Line {} has no word boxes, using line metrics (top={}, height={}, width={})",
            index, min_top, max_height, width
        );
        return Rectangle::new(index, line.text.clone(), 0.0, min_top, width, max_height);
    }

    let left = line.words.iter().map(|w| w.left).fold(f64::INFINITY, f64::min);
    let top = line.words.iter().map(|w| w.top).fold(f64::INFINITY, f64::min);
    let right = line
        .words
        .iter()
        .map(|w| w.left + w.width)
        .fold(f64::NEG_INFINITY, f64::max);
    let bottom = line
        .words
        .iter()
        .map(|w| w.top + w.height)
        .fold(f64::NEG_INFINITY, f64::max);

    Rectangle::new(index, line.text.clone(), left, top, right - left, bottom - top)
}
