//! Document pipeline: bytes to text to fields.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{FacturaError, Result};
use crate::invoice::ExtractionResult;
use crate::services::{StructuredFieldService, TextExtractionService};

/// Outcome of processing one document.
///
/// A failed document carries its error instead of aborting the caller.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Document name, usually its path.
    pub name: String,
    /// Length of the extracted text in bytes (0 if extraction failed).
    pub text_len: usize,
    /// Extracted fields or the reason there are none.
    pub result: Result<ExtractionResult>,
    /// Wall time spent on the document.
    pub processing_time_ms: u64,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(ToString::to_string)
    }
}

/// Text extraction followed by field extraction, with both collaborators
/// supplied by the caller.
pub struct InvoicePipeline {
    text: Box<dyn TextExtractionService>,
    fields: Box<dyn StructuredFieldService>,
}

impl InvoicePipeline {
    pub fn new(
        text: Box<dyn TextExtractionService>,
        fields: Box<dyn StructuredFieldService>,
    ) -> Self {
        Self { text, fields }
    }

    /// Process one document. Never panics on bad input; failures are in the outcome.
    pub fn process(&self, name: &str, document: &[u8]) -> DocumentOutcome {
        let start = Instant::now();
        info!("Processing {} with {} source", name, self.text.name());

        let mut text_len = 0;
        let result = self.text.extract_text(document).and_then(|text| {
            text_len = text.len();
            self.fields_from_text(name, &text)
        });

        let processing_time_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(fields) => debug!(
                "{}: {} fields found in {}ms",
                name,
                fields.found_count(),
                processing_time_ms
            ),
            Err(e) => warn!("{}: extraction failed: {}", name, e),
        }

        DocumentOutcome {
            name: name.to_string(),
            text_len,
            result,
            processing_time_ms,
        }
    }

    /// Run field extraction on text that is already available.
    pub fn process_text(&self, text: &str) -> Result<ExtractionResult> {
        self.fields_from_text("<text>", text)
    }

    fn fields_from_text(&self, name: &str, text: &str) -> Result<ExtractionResult> {
        if text.trim().is_empty() {
            return Err(FacturaError::EmptyText);
        }
        debug!("{}: {} bytes of text, fields by {}", name, text.len(), self.fields.name());

        let result = self.fields.extract_fields(text)?;
        let missing = result.missing();
        if !missing.is_empty() {
            debug!("{}: not found: {}", name, missing.join(", "));
        }
        Ok(result)
    }
}
