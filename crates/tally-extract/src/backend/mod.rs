//! Extraction backend implementations.

#[cfg(feature = "http")]
pub mod http;

mod fixture;

pub use fixture::FixtureExtractor;

use tally_core::BatchResult;

use crate::{ExtractError, Result};

/// Parse a backend answer into a batch result.
///
/// Tolerates a surrounding markdown code fence and leading prose before the
/// JSON object.
pub fn parse_batch_result(raw: &str) -> Result<BatchResult> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed);

    let start = body
        .find('{')
        .ok_or_else(|| ExtractError::InvalidResponse("no JSON object in response".to_string()))?;
    let end = body
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| ExtractError::InvalidResponse("unterminated JSON object".to_string()))?;

    serde_json::from_str(&body[start..=end]).map_err(|e| ExtractError::InvalidResponse(e.to_string()))
}
