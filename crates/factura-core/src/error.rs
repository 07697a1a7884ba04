//! Error types for the factura-core library.

use thiserror::Error;

/// Main error type for the factura library.
#[derive(Error, Debug)]
pub enum FacturaError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Field schema construction error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The text source produced no usable text.
    #[error("no text extracted from document")]
    EmptyText,

    /// Document bytes were not valid UTF-8 text.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

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

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to invoice field extraction.
///
/// A field whose rules did not match is not an error; see
/// [`FieldValue::NotFound`](crate::invoice::FieldValue::NotFound).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A currency or percentage token could not be parsed to a number.
    #[error("failed to parse {field}: {value:?}")]
    NumericParse { field: String, value: String },

    /// A computed amount does not fit in a decimal.
    #[error("arithmetic overflow computing {0}")]
    Overflow(String),
}

impl ExtractionError {
    pub(crate) fn numeric(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NumericParse {
            field: field.into(),
            value: value.into(),
        }
    }

    pub(crate) fn overflow(field: &str) -> Self {
        Self::Overflow(field.to_string())
    }
}

/// Errors raised while building a field schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// A field was declared without any pattern.
    #[error("field {0} has no pattern alternatives")]
    NoAlternatives(String),

    /// A pattern failed to compile.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    /// A pattern does not have exactly one capture group.
    #[error("pattern for {field} must have exactly one capture group, found {groups}")]
    CaptureGroups { field: String, groups: usize },

    /// The totals binding refers to a field the schema does not declare.
    #[error("totals binding refers to unknown field: {0}")]
    UnknownField(String),

    /// No built-in catalog has this name.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),
}

/// Result type for the factura library.
pub type Result<T> = std::result::Result<T, FacturaError>;
