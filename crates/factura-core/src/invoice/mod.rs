//! Invoice field extraction module.

mod matcher;
mod parser;
pub mod rules;
mod schema;
mod tokens;
mod totals;

pub use matcher::{collapse_whitespace, match_field, FieldRule, FieldValue, NOT_FOUND_MARKER};
pub use parser::{ExtractionResult, InvoiceParser};
pub use schema::{FieldSchema, FieldSpec, TotalsBinding, ValueKind, BUILTIN_SCHEMAS};
pub use tokens::{extract_pair, parse_tokens, Token, TokenDocument, TokenSchema};
pub use totals::{compute_totals, subtotal};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
