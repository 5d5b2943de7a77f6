//! Backend replaying recorded batch results.

use std::path::{Path, PathBuf};

use tally_core::{BatchExtractor, BatchResult, ExtractionRequest};
use tracing::debug;

use crate::{ExtractError, Result};

enum Source {
    Dir(PathBuf),
    Memory(Vec<BatchResult>),
}

/// Returns a recorded result for each batch, by batch number.
///
/// A directory source reads `batch-1.json`, `batch-2.json`, ... on demand.
pub struct FixtureExtractor {
    source: Source,
}

impl FixtureExtractor {
    /// Replay results stored as `batch-N.json` files in `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            source: Source::Dir(dir.as_ref().to_path_buf()),
        }
    }

    /// Replay results held in memory, first result for batch 1.
    pub fn from_results(results: Vec<BatchResult>) -> Self {
        Self {
            source: Source::Memory(results),
        }
    }

    /// Path of the fixture file for a batch.
    pub fn fixture_path(dir: &Path, batch_number: usize) -> PathBuf {
        dir.join(format!("batch-{batch_number}.json"))
    }

    fn load(&self, batch_number: usize) -> Result<BatchResult> {
        match &self.source {
            Source::Dir(dir) => {
                let path = Self::fixture_path(dir, batch_number);
                if !path.exists() {
                    return Err(ExtractError::MissingFixture {
                        batch: batch_number,
                        path,
                    });
                }
                debug!("Replaying batch {} from {}", batch_number, path.display());
                let content = std::fs::read_to_string(&path)?;
                Ok(serde_json::from_str(&content)?)
            }
            Source::Memory(results) => batch_number
                .checked_sub(1)
                .and_then(|i| results.get(i))
                .cloned()
                .ok_or_else(|| ExtractError::MissingFixture {
                    batch: batch_number,
                    path: PathBuf::from("<memory>"),
                }),
        }
    }
}

impl BatchExtractor for FixtureExtractor {
    type Error = ExtractError;

    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<BatchResult> {
        self.load(request.batch_number)
    }
}
