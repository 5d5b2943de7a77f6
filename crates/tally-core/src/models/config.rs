//! Configuration structures for the statement import pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

/// Main configuration for tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Statement segmentation configuration.
    pub segmenter: SegmenterConfig,

    /// Extraction backend configuration.
    pub extraction: ExtractionConfig,

    /// Duplicate detection configuration.
    pub dedup: DedupConfig,
}

/// Segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Maximum transaction lines sent to the extractor in one call.
    pub max_transactions_per_segment: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_transactions_per_segment: 30,
        }
    }
}

/// Extraction backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,

    /// Model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Maximum completion tokens per batch.
    pub max_tokens: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Number of batches extracted concurrently (1 = sequential).
    pub concurrency: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 8192,
            timeout_secs: 120,
            concurrency: 1,
        }
    }
}

/// Duplicate detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Existing records listed in the first batch's duplicate hint (0 = no hint).
    pub hint_limit: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { hint_limit: 50 }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TallyError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| TallyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
