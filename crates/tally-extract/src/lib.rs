//! Transaction extraction backends for tally.
//!
//! Each backend implements [`tally_core::BatchExtractor`]:
//! - `LlmExtractor` calls an OpenAI-compatible chat completions API
//! - [`FixtureExtractor`] replays recorded batch results, for offline runs and tests

mod backend;
mod error;
pub mod prompt;

pub use backend::{parse_batch_result, FixtureExtractor};
pub use error::ExtractError;

#[cfg(feature = "http")]
pub use backend::http::LlmExtractor;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
