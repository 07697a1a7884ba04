//! Rule-based extractors and numeric parsing for invoice fields.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod patterns;

pub use amounts::{parse_amount, parse_percentage, CURRENCY_SYMBOLS};
pub use dates::parse_date;
pub use items::LineItemRule;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
