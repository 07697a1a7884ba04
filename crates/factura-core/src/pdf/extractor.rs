//! PDF text extraction using lopdf and pdf-extract.

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::{FacturaError, PdfError};
use crate::services::TextExtractionService;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 1,
        }
    }

    /// Minimum number of non-blank characters for a page layer to count as text.
    pub fn with_min_text_length(mut self, min_text_length: usize) -> Self {
        self.min_text_length = min_text_length;
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Join per-page lopdf text, used when pdf-extract cannot handle the file.
    fn extract_text_by_page(&self) -> Result<String> {
        let mut full_text = String::new();
        for page in 1..=self.page_count() {
            let page_text = self.extract_page_text(page).unwrap_or_default();
            if page_text.trim().is_empty() {
                continue;
            }
            if !full_text.is_empty() {
                full_text.push_str("\n\n");
            }
            full_text.push_str(page_text.trim_end());
        }
        Ok(full_text)
    }

    fn classify_text(&self, text: &str) -> PdfType {
        let text_len = text.chars().filter(|c| !c.is_whitespace()).count();
        let images = self.image_count();

        let pdf_type = PdfType::classify(text_len, self.min_text_length, images);
        debug!(
            "PDF analysis: {} pages, {} chars text, {} images -> {:?}",
            self.page_count(),
            text_len,
            images,
            pdf_type
        );
        pdf_type
    }
}

/// Run a pdf-extract call, reporting a panic (malformed fonts, broken
/// encodings) as an error instead of unwinding into the caller.
fn guard_extract<E: Display>(
    extract: impl FnOnce() -> std::result::Result<String, E>,
) -> std::result::Result<String, String> {
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("pdf-extract panicked: {}", reason))
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image_xobject(object: &Object) -> bool {
    let Object::Stream(stream) = object else {
        return false;
    };
    stream
        .dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .map(|name| name == b"Image")
        .unwrap_or(false)
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the decrypted bytes
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

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn image_count(&self) -> usize {
        self.document
            .as_ref()
            .map(|doc| doc.objects.values().filter(|obj| is_image_xobject(obj)).count())
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let text = self.extract_text().unwrap_or_default();
        self.classify_text(&text)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;

        match guard_extract(|| pdf_extract::extract_text_from_mem(&self.raw_data)) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("{}, falling back to per-page text", e);
                self.extract_text_by_page()
                    .map_err(|_| PdfError::TextExtraction(e))
            }
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        let text = doc
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        trace!("Page {}: {} bytes of text", page, text.len());
        Ok(text)
    }
}

/// [`TextExtractionService`] over PDF bytes.
///
/// Only the embedded text layer is read. Documents without one (scans) are
/// reported as [`FacturaError::EmptyText`].
#[derive(Debug, Clone, Copy)]
pub struct PdfTextSource {
    min_text_length: usize,
}

impl PdfTextSource {
    pub fn new(min_text_length: usize) -> Self {
        Self { min_text_length }
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TextExtractionService for PdfTextSource {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract_text(&self, document: &[u8]) -> crate::Result<String> {
        let mut extractor = PdfExtractor::new().with_min_text_length(self.min_text_length);
        extractor.load(document)?;

        let text = extractor.extract_text()?;
        let pdf_type = extractor.classify_text(&text);
        if !pdf_type.has_text() {
            warn!("PDF has no text layer ({:?}); scanned pages need OCR first", pdf_type);
            return Err(FacturaError::EmptyText);
        }

        Ok(text)
    }
}
