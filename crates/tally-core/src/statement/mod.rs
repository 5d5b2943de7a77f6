//! Bank statement batching, merging and duplicate detection.

mod aggregator;
mod dedup;
mod pipeline;
mod segmenter;
pub mod rules;

pub use aggregator::{merge, merge_on};
pub use dedup::{annotate, Deduplicator};
pub use pipeline::{duplicate_hint, BatchExtractor, ExtractionRequest, ImportPipeline};
pub use segmenter::{segment_text, Segment, Segmenter};
