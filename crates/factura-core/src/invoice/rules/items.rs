//! Line-item capture.

use regex::{Captures, Regex};

use crate::error::SchemaError;
use crate::models::invoice::LineItem;

use super::patterns::LINE_ITEM;
use super::FieldExtractor;

/// Repeating pattern that captures invoice rows.
///
/// The pattern needs four capture groups: description, quantity, unit price
/// and line total. Matches are non-overlapping and returned in text order.
#[derive(Debug, Clone)]
pub struct LineItemRule {
    pattern: Regex,
}

impl LineItemRule {
    /// Rule with the built-in row pattern.
    pub fn new() -> Self {
        Self {
            pattern: LINE_ITEM.clone(),
        }
    }

    /// Rule with a custom row pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self, SchemaError> {
        let pattern = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            field: "line_items".to_string(),
            reason: e.to_string(),
        })?;

        let groups = pattern.captures_len() - 1;
        if groups != 4 {
            return Err(SchemaError::CaptureGroups {
                field: "line_items".to_string(),
                groups,
            });
        }

        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn to_item(caps: &Captures<'_>) -> LineItem {
        LineItem {
            description: group(caps, 1).trim().to_string(),
            quantity: group(caps, 2).to_string(),
            unit_price: group(caps, 3).to_string(),
            amount: group(caps, 4).to_string(),
        }
    }
}

fn group<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

impl Default for LineItemRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemRule {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern.captures(text).map(|caps| Self::to_item(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .map(|caps| Self::to_item(&caps))
            .collect()
    }
}
