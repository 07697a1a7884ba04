//! PDF text extraction module.

mod extractor;

pub use extractor::{PdfExtractor, PdfTextSource};

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

impl PdfType {
    /// Classify from the amount of text and the number of embedded images.
    pub fn classify(text_len: usize, min_text_length: usize, images: usize) -> Self {
        match (text_len >= min_text_length.max(1), images > 0) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }

    pub fn has_text(&self) -> bool {
        matches!(self, PdfType::Text | PdfType::Hybrid)
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Number of image XObjects in the document.
    fn image_count(&self) -> usize;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PdfType::classify(120, 1, 0), PdfType::Text);
        assert_eq!(PdfType::classify(0, 1, 2), PdfType::Image);
        assert_eq!(PdfType::classify(120, 1, 2), PdfType::Hybrid);
        assert_eq!(PdfType::classify(0, 1, 0), PdfType::Empty);
        assert_eq!(PdfType::classify(30, 50, 0), PdfType::Empty);
        assert_eq!(PdfType::classify(0, 0, 0), PdfType::Empty);
    }

    #[test]
    fn test_has_text() {
        assert!(PdfType::Hybrid.has_text());
        assert!(!PdfType::Image.has_text());
    }
}
