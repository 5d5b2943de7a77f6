//! Data models and configuration.

pub mod config;
pub mod transaction;

pub use config::{DedupConfig, ExtractionConfig, SegmenterConfig, TallyConfig};
pub use transaction::*;
