//! Core library for bank statement import.
//!
//! This crate provides:
//! - Statement text loading (PDF, CSV and plain text)
//! - Segmentation of long statements into batches of whole transaction lines
//! - Merging of per-batch extraction results into one result set
//! - Duplicate detection against the user's existing records
//! - An import pipeline driving any [`BatchExtractor`] backend

pub mod document;
pub mod error;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod statement;

pub use error::{PdfError, Result, TallyError};
pub use models::{
    AnnotatedTransaction, BatchResult, BatchSummary, DateRange, ExistingRecord, ExistingRecords,
    ImportPreview, MergedResult, SuggestedAction, TallyConfig, Transaction, TransactionType,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use statement::{
    annotate, merge, segment_text, BatchExtractor, Deduplicator, ExtractionRequest,
    ImportPipeline, Segment, Segmenter,
};
