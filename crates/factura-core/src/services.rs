//! Collaborator traits for turning documents into fields.
//!
//! A document goes through two services: one produces text from bytes, the
//! other produces fields from text. Both are passed explicitly to
//! [`InvoicePipeline`](crate::pipeline::InvoicePipeline).

use crate::error::Result;
use crate::invoice::{ExtractionResult, FieldSchema, InvoiceParser};

/// Produces plain text from document bytes (PDF text layer, OCR, ...).
pub trait TextExtractionService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Extract the document text.
    fn extract_text(&self, document: &[u8]) -> Result<String>;
}

/// Produces structured fields from document text.
pub trait StructuredFieldService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Resolve fields from text.
    fn extract_fields(&self, text: &str) -> Result<ExtractionResult>;
}

/// Bytes that already are UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextExtractionService for PlainTextSource {
    fn name(&self) -> &str {
        "text"
    }

    fn extract_text(&self, document: &[u8]) -> Result<String> {
        Ok(String::from_utf8(document.to_vec())?)
    }
}

/// Ordered pattern rules over a [`FieldSchema`].
#[derive(Debug, Clone)]
pub struct RuleFieldService {
    schema: FieldSchema,
    compute_totals: bool,
}

impl RuleFieldService {
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            compute_totals: true,
        }
    }

    /// Skip line items and totals when `false`.
    pub fn with_totals(mut self, compute_totals: bool) -> Self {
        self.compute_totals = compute_totals;
        self
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }
}

impl StructuredFieldService for RuleFieldService {
    fn name(&self) -> &str {
        self.schema.name()
    }

    fn extract_fields(&self, text: &str) -> Result<ExtractionResult> {
        if self.compute_totals {
            Ok(self.schema.parse(text)?)
        } else {
            Ok(self.schema.match_fields(text))
        }
    }
}
