pub mod image_ops;
pub mod metrics;

// Re-export commonly used items
pub use image_ops::{probe_image, probe_image_async};
pub use metrics::{Metrics, MetricsSnapshot};
