//! Error types for the tally-core library.

use thiserror::Error;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The uploaded document produced no usable text.
    #[error("document contains no text")]
    EmptyDocument,

    /// The input file type is not supported.
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    /// Extraction of one batch failed; the whole import is aborted.
    #[error("extraction failed for batch {batch} of {total}: {source}")]
    Batch {
        batch: usize,
        total: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// PDF support was compiled out.
    #[error("PDF support is not enabled in this build")]
    Disabled,
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
