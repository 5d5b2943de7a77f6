//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::{debug, trace};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// Minimum characters of embedded text for a PDF to count as text-based.
const MIN_TEXT_LENGTH: usize = 50;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text of the whole document.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Extract text and classify the loaded document.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let doc = self.document.as_ref().ok_or(PdfError::Parse("No document loaded".to_string()))?;

        let images = doc.objects.values().filter(|o| is_image(o)).count();
        trace!("Found {} image objects", images);

        let text = self.extract_text()?;
        let pdf_type = classify(text.trim().len(), images);
        debug!("PDF analysis: {} chars text -> {:?}", text.len(), pdf_type);

        Ok(PdfContent { pdf_type, text })
    }
}

fn classify(text_len: usize, images: usize) -> PdfType {
    match (text_len > MIN_TEXT_LENGTH, images > 0) {
        (true, false) => PdfType::Text,
        (false, true) => PdfType::Image,
        (true, true) => PdfType::Hybrid,
        (false, false) => PdfType::Empty,
    }
}

fn is_image(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Subtype")
            .and_then(|s| s.as_name())
            .is_ok_and(|name| name == b"Image"),
        _ => false,
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Statements are often "encrypted" with an empty user password.
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
