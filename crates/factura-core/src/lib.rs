//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - Ordered pattern rules per field, first match wins
//! - Built-in field catalogs (canonical invoice, Spanish OCR)
//! - Line items and subtotal/discount/tax totals in exact decimals
//! - Label/value pairs over layout tokens
//! - PDF text extraction (feature `pdf`)
//! - A pipeline over injected text and field services

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod pipeline;
pub mod services;

pub use error::{ExtractionError, FacturaError, Result, SchemaError};
pub use invoice::{
    compute_totals, extract_pair, match_field, ExtractionResult, FieldRule, FieldSchema,
    FieldValue, InvoiceParser, Token, TokenSchema,
};
pub use models::config::FacturaConfig;
pub use models::invoice::{InvoiceRecord, InvoiceTotals, LineItem};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor, PdfTextSource, PdfType};
pub use pipeline::{DocumentOutcome, InvoicePipeline};
pub use services::{PlainTextSource, RuleFieldService, StructuredFieldService, TextExtractionService};
