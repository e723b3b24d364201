pub mod http;
pub mod pipeline;

pub use pipeline::{validate_api_key, PageTranslator};
