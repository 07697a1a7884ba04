//! Invoice data models.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::invoice::rules::{parse_date, FieldExtractor, LineItemRule};
use crate::invoice::ExtractionResult;

/// One itemized row as captured from the document text.
///
/// Values are kept as captured; only `amount` is ever parsed, when totals are
/// computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description.
    pub description: String,

    /// Quantity token.
    pub quantity: String,

    /// Unit price token.
    pub unit_price: String,

    /// Line total including its currency symbol (e.g. `€100.00`).
    pub amount: String,
}

impl LineItem {
    /// Build an item from its line total alone.
    pub fn with_amount(amount: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            quantity: String::new(),
            unit_price: String::new(),
            amount: amount.into(),
        }
    }

    /// Parse a single row such as `Logo design 2 50 €100.00`.
    pub fn from_row(row: &str) -> Option<Self> {
        LineItemRule::new().extract(row)
    }
}

/// Totals derived from line items and the discount/tax percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of counted line totals.
    pub subtotal: Decimal,

    /// Subtotal after discount.
    pub discounted_total: Decimal,

    /// Discounted total after tax.
    pub final_total: Decimal,
}

impl InvoiceTotals {
    /// Totals rounded to cents, midpoint away from zero.
    pub fn rounded(&self) -> Self {
        let round = |d: Decimal| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal: round(self.subtotal),
            discounted_total: round(self.discounted_total),
            final_total: round(self.final_total),
        }
    }
}

/// Canonical invoice fields in a fixed shape.
///
/// Built from a result of the `invoice` catalog; fields not found are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,

    /// Tax percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,

    /// Discount percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,

    /// Computed totals, when line items were present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<InvoiceTotals>,
}

impl InvoiceRecord {
    /// Copy the canonical fields out of an extraction result.
    pub fn from_result(result: &ExtractionResult) -> Self {
        let field = |name: &str| result.value(name).map(str::to_string);

        Self {
            date: field("date"),
            invoice_number: field("invoice_number"),
            client: field("client"),
            subtotal: field("subtotal"),
            tax: field("tax"),
            discount: field("discount"),
            total: field("total"),
            notes: field("notes"),
            terms: field("terms"),
            totals: result.totals().copied(),
        }
    }

    /// Issue date as a calendar date, if it is a day-first date.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }

    /// Names of the canonical fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("date", &self.date),
            ("invoice_number", &self.invoice_number),
            ("client", &self.client),
            ("subtotal", &self.subtotal),
            ("tax", &self.tax),
            ("discount", &self.discount),
            ("total", &self.total),
            ("notes", &self.notes),
            ("terms", &self.terms),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::FieldValue;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_line_item_from_row() {
        let item = LineItem::from_row("a 1 1 €10.00").unwrap();
        assert_eq!(item.description, "a");
        assert_eq!(item.amount, "€10.00");
        assert_eq!(LineItem::from_row("no amount"), None);
    }

    #[test]
    fn test_totals_rounded() {
        let totals = InvoiceTotals {
            subtotal: Decimal::from_str("10.005").unwrap(),
            discounted_total: Decimal::from_str("9.004").unwrap(),
            final_total: Decimal::from_str("-1.125").unwrap(),
        };

        let rounded = totals.rounded();
        assert_eq!(rounded.subtotal, Decimal::from_str("10.01").unwrap());
        assert_eq!(rounded.discounted_total, Decimal::from_str("9.00").unwrap());
        assert_eq!(rounded.final_total, Decimal::from_str("-1.13").unwrap());
    }

    #[test]
    fn test_record_from_result() {
        let mut result = ExtractionResult::new("invoice");
        result.push("date", FieldValue::Found("20/02/2021".into()));
        result.push("invoice_number", FieldValue::Found("10940".into()));
        result.push("client", FieldValue::NotFound);

        let record = InvoiceRecord::from_result(&result);
        assert_eq!(record.invoice_number.as_deref(), Some("10940"));
        assert_eq!(record.client, None);
        assert_eq!(record.issue_date(), NaiveDate::from_ymd_opt(2021, 2, 20));
        assert!(record.missing_fields().contains(&"client"));
        assert!(!record.missing_fields().contains(&"date"));
    }
}
