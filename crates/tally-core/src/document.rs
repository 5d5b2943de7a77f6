//! Loading the raw text of an uploaded statement.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{PdfError, Result, TallyError};

/// Kind of uploaded statement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Csv,
    Text,
}

impl DocumentKind {
    /// Determine the document kind from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "csv" | "tsv" => Ok(DocumentKind::Csv),
            "" | "txt" | "text" => Ok(DocumentKind::Text),
            "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp" | "heic" => Err(
                TallyError::UnsupportedDocument(format!("{extension} (image statements need OCR)")),
            ),
            other => Err(TallyError::UnsupportedDocument(other.to_string())),
        }
    }
}

/// Read the text of a statement file.
pub fn load_text(path: &Path) -> Result<String> {
    let kind = DocumentKind::from_path(path)?;
    debug!("Loading {:?} document from {}", kind, path.display());

    let text = match kind {
        DocumentKind::Pdf => pdf_text(&std::fs::read(path)?)?,
        DocumentKind::Csv | DocumentKind::Text => std::fs::read_to_string(path)?,
    };

    if text.trim().is_empty() {
        return Err(TallyError::EmptyDocument);
    }
    Ok(text)
}

/// Extract the embedded text of a PDF statement.
#[cfg(feature = "pdf")]
pub fn pdf_text(data: &[u8]) -> Result<String> {
    use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;

    let content = extractor.extract_all()?;
    match content.pdf_type {
        PdfType::Text | PdfType::Hybrid => Ok(content.text),
        PdfType::Image => {
            warn!("PDF has no embedded text; scanned statements are not supported");
            Err(TallyError::EmptyDocument)
        }
        PdfType::Empty => Err(TallyError::Pdf(PdfError::TextExtraction(
            "no text found".to_string(),
        ))),
    }
}

#[cfg(not(feature = "pdf"))]
pub fn pdf_text(_data: &[u8]) -> Result<String> {
    warn!("PDF statement given but PDF support is disabled");
    Err(TallyError::Pdf(PdfError::Disabled))
}
