//! Ordered-fallback field matching.
//!
//! A [`FieldRule`] holds the pattern alternatives for one field. They are
//! tried strictly in declaration order and the first alternative that matches
//! anywhere in the text decides the value. Later alternatives are never
//! consulted once an earlier one has matched, even if they would capture
//! something "better".

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;

use super::rules::patterns::WHITESPACE_RUN;
use super::rules::FieldExtractor;

/// Marker printed for fields that no rule matched.
pub const NOT_FOUND_MARKER: &str = "No encontrado";

/// Value resolved for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// An alternative matched; holds the trimmed, whitespace-collapsed capture.
    Found(String),
    /// Every alternative was tried and none matched.
    NotFound,
}

impl FieldValue {
    pub fn is_found(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }

    /// The captured value, if any.
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            FieldValue::Found(value) => Some(value),
            FieldValue::NotFound => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            FieldValue::Found(value) => Some(value),
            FieldValue::NotFound => None,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::NotFound, FieldValue::Found)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Found(value) => f.write_str(value),
            FieldValue::NotFound => f.write_str(NOT_FOUND_MARKER),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_deref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Ordered pattern alternatives for one field.
///
/// Every alternative is compiled case-insensitive with `.` matching newlines,
/// so a label and its value may sit on different OCR lines. Each alternative
/// has exactly one capture group, which designates the value.
#[derive(Debug, Clone)]
pub struct FieldRule {
    alternatives: Vec<Regex>,
}

impl FieldRule {
    /// Compile the alternatives for `field`, in order.
    pub fn new<I, S>(field: &str, patterns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives = patterns
            .into_iter()
            .map(|pattern| compile_alternative(field, pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if alternatives.is_empty() {
            return Err(SchemaError::NoAlternatives(field.to_string()));
        }

        Ok(Self { alternatives })
    }

    /// Source patterns in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().map(Regex::as_str)
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

fn compile_alternative(field: &str, pattern: &str) -> Result<Regex, SchemaError> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SchemaError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })?;

    // captures_len counts the implicit whole-match group
    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(SchemaError::CaptureGroups {
            field: field.to_string(),
            groups,
        });
    }

    Ok(regex)
}

/// Resolve one field: first matching alternative wins.
pub fn match_field(text: &str, rule: &FieldRule) -> FieldValue {
    rule.alternatives
        .iter()
        .find_map(|regex| regex.captures(text))
        .map(|caps| {
            let value = caps.get(1).map_or("", |m| m.as_str());
            FieldValue::Found(collapse_whitespace(value))
        })
        .unwrap_or(FieldValue::NotFound)
}

/// Trim and squeeze every whitespace run (newlines included) to one space.
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

impl FieldExtractor for FieldRule {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        match_field(text, self).into_option()
    }

    /// The value each matching alternative would produce, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.alternatives
            .iter()
            .filter_map(|regex| regex.captures(text))
            .map(|caps| collapse_whitespace(caps.get(1).map_or("", |m| m.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(patterns: &[&str]) -> FieldRule {
        FieldRule::new("test", patterns).unwrap()
    }

    #[test]
    fn test_first_alternative_wins() {
        let rule = rule(&[r"Numero[:\s]+(\d+)", r"(\d+)"]);
        let text = "Ref 77\nNumero: 10940";

        assert_eq!(match_field(text, &rule), FieldValue::Found("10940".into()));
    }

    #[test]
    fn test_first_alternative_matches_direct_application() {
        let rule = rule(&[r"Cliente[:\s]+(.+?)\n", r"Cliente(.*)"]);
        let text = "Factura\nCliente:   Ana   Ruiz \nDomicilio: Calle 1\n";

        let direct = RegexBuilder::new(r"Cliente[:\s]+(.+?)\n")
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .unwrap()
            .captures(text)
            .map(|c| collapse_whitespace(&c[1]))
            .unwrap();

        assert_eq!(match_field(text, &rule), FieldValue::Found(direct));
        assert_eq!(match_field(text, &rule).as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn test_falls_back_in_order() {
        let rule = rule(&[r"Invoice\s*#\s*(\d+)", r"N[uú]mero[:\s]+(\d+)"]);

        assert_eq!(
            match_field("NÚMERO: 55", &rule),
            FieldValue::Found("55".into())
        );
    }

    #[test]
    fn test_no_match_is_not_found() {
        let rule = rule(&[r"Total[:\s]+([\d.,]+)", r"Importe[:\s]+([\d.,]+)"]);

        assert_eq!(match_field("nothing here", &rule), FieldValue::NotFound);
        assert_eq!(match_field("", &rule), FieldValue::NotFound);
    }

    #[test]
    fn test_case_insensitive_and_crosses_lines() {
        let rule = rule(&[r"notes:\s*(.*?)\s*terms:"]);
        let text = "NOTES:\n  Thanks for\n  your business\nTERMS: 30 days";

        assert_eq!(
            match_field(text, &rule),
            FieldValue::Found("Thanks for your business".into())
        );
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let once = collapse_whitespace("  C. Bolivar \n\t y  6 de octubre  ");
        assert_eq!(once, "C. Bolivar y 6 de octubre");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn test_non_participating_group_is_empty_found() {
        let rule = rule(&[r"Ref(?:\s+(\d+))?"]);

        assert_eq!(match_field("Ref", &rule), FieldValue::Found(String::new()));
        assert_ne!(match_field("Ref", &rule), FieldValue::NotFound);
    }

    #[test]
    fn test_rejects_wrong_group_count() {
        let err = FieldRule::new("concepto", [r"Publicidad[^\n]+"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::CaptureGroups {
                field: "concepto".into(),
                groups: 0
            }
        );

        assert!(FieldRule::new("x", [r"(a)(b)"]).is_err());
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        let empty: [&str; 0] = [];
        assert_eq!(
            FieldRule::new("x", empty).unwrap_err(),
            SchemaError::NoAlternatives("x".into())
        );
        assert!(matches!(
            FieldRule::new("x", [r"(unclosed"]),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_extract_all_lists_candidates() {
        let rule = rule(&[r"TOTAL\s*A?\s*PAGAR[:\s]+([\d.,]+)", r"TOTAL[:\s]+([\d.,]+)"]);
        let text = "SUBTOTAL: 52.00\nTOTAL A PAGAR: 62.92";

        assert_eq!(rule.extract(text), Some("62.92".to_string()));
        assert_eq!(rule.extract_all(text), vec!["62.92", "52.00"]);
    }

    #[test]
    fn test_field_value_serde_and_display() {
        assert_eq!(serde_json::to_string(&FieldValue::NotFound).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&FieldValue::Found("10".into())).unwrap(),
            "\"10\""
        );
        let back: FieldValue = serde_json::from_str("null").unwrap();
        assert_eq!(back, FieldValue::NotFound);
        assert_eq!(FieldValue::NotFound.to_string(), NOT_FOUND_MARKER);
    }
}
