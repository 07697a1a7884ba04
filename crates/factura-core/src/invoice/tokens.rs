//! Label/value extraction over layout tokens.
//!
//! Layout-aware parsers emit the document as an ordered list of text
//! fragments. A value is the fragment that directly follows its label.
//! Labels compare exactly and case-sensitively, and values are returned
//! verbatim, unlike the text matcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FacturaError;

use super::matcher::FieldValue;
use super::parser::ExtractionResult;

/// One text fragment with optional position metadata.
///
/// Geometry is carried through as raw JSON and never used for matching, so
/// producers may encode it however they like (`1`, `1.0`, `"150"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Text of the token right after the first `label` token that has a follower.
pub fn extract_pair(tokens: &[Token], label: &str) -> FieldValue {
    tokens
        .windows(2)
        .find(|pair| pair[0].text == label)
        .map(|pair| FieldValue::Found(pair[1].text.clone()))
        .unwrap_or(FieldValue::NotFound)
}

/// A token sequence as serialized by layout parsers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenDocument {
    /// `{"texts": [...]}`
    Wrapped { texts: Vec<Token> },
    /// `[...]`
    Bare(Vec<Token>),
}

impl TokenDocument {
    pub fn into_tokens(self) -> Vec<Token> {
        match self {
            TokenDocument::Wrapped { texts } => texts,
            TokenDocument::Bare(tokens) => tokens,
        }
    }
}

/// Parse a JSON token document.
pub fn parse_tokens(json: &str) -> Result<Vec<Token>, FacturaError> {
    let document: TokenDocument = serde_json::from_str(json)?;
    Ok(document.into_tokens())
}

/// Ordered `(field, label)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSchema {
    labels: Vec<(String, String)>,
}

impl TokenSchema {
    pub const NAME: &'static str = "tokens";

    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Add a field, or relabel it if it already exists.
    pub fn with_label(mut self, field: &str, label: &str) -> Self {
        match self.labels.iter_mut().find(|(f, _)| f == field) {
            Some((_, existing)) => *existing = label.to_string(),
            None => self.labels.push((field.to_string(), label.to_string())),
        }
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(f, l)| (f.as_str(), l.as_str()))
    }

    /// Resolve every label against the sequence.
    pub fn extract(&self, tokens: &[Token]) -> ExtractionResult {
        let mut result = ExtractionResult::new(Self::NAME);
        for (field, label) in self.labels() {
            result.push(field, extract_pair(tokens, label));
        }
        result
    }
}

impl Default for TokenSchema {
    fn default() -> Self {
        Self::new()
            .with_label("invoice_number", "Invoice Number")
            .with_label("order_number", "Order Number")
            .with_label("invoice_date", "Invoice Date")
            .with_label("due_date", "Due Date")
            .with_label("total_due", "Total Due")
            .with_label("from", "From:")
            .with_label("to", "To:")
    }
}
