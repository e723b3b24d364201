// Text region clustering
//
// Recognized lines -> rectangles -> connected components -> text blocks

pub mod builder;
pub mod finalize;
pub mod neighbor;
pub mod rectangle;

pub use builder::{build_clusters, Cluster};
pub use finalize::finalize_cluster;
pub use neighbor::is_neighbor;
pub use rectangle::{extract_rectangles, Rectangle};

use tracing::debug;

use crate::core::types::{RecognizedLine, TextBlock};

/// Group recognized lines into text blocks in cluster emission order.
///
/// An empty result means no detectable text; callers decide whether that is
/// an error.
pub fn cluster_lines(lines: &[RecognizedLine], page_width: Option<f64>) -> Vec<TextBlock> {
    let rects = extract_rectangles(lines, page_width);
    if rects.is_empty() {
        return Vec::new();
    }

    let clusters = build_clusters(&rects);
    debug!(
        "Clustered {} lines into {} blocks",
        rects.len(),
        clusters.len()
    );

    clusters.iter().map(finalize_cluster).collect()
}
