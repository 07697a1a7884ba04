//! Subtotal, discount and tax computation.
//!
//! When two or more line items were captured, the last one is the totals row
//! of the source layout and is left out of the subtotal. A single captured
//! item is counted. This positional convention is kept as-is.

use rust_decimal::Decimal;

use crate::error::ExtractionError;
use crate::models::invoice::{InvoiceTotals, LineItem};

use super::rules::{parse_amount, parse_percentage};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Derive subtotal, discounted total and final total.
///
/// `discount_percent` and `tax_percent` are raw captures. Absent or blank
/// values leave the amount unchanged; anything that is not an integer fails
/// the whole computation, as does any line total that does not parse.
pub fn compute_totals(
    items: &[LineItem],
    discount_percent: Option<&str>,
    tax_percent: Option<&str>,
) -> Result<InvoiceTotals, ExtractionError> {
    let subtotal = subtotal(items)?;

    let discounted_total = match percentage("discount", discount_percent)? {
        Some(discount) => subtotal
            .checked_mul(discount)
            .and_then(|d| d.checked_div(HUNDRED))
            .and_then(|d| subtotal.checked_sub(d))
            .ok_or_else(|| ExtractionError::overflow("discounted_total"))?,
        None => subtotal,
    };

    let final_total = match percentage("tax", tax_percent)? {
        Some(tax) => discounted_total
            .checked_mul(tax)
            .and_then(|t| t.checked_div(HUNDRED))
            .and_then(|t| discounted_total.checked_add(t))
            .ok_or_else(|| ExtractionError::overflow("final_total"))?,
        None => discounted_total,
    };

    Ok(InvoiceTotals {
        subtotal,
        discounted_total,
        final_total,
    })
}

/// Sum of line totals, excluding the trailing totals row.
pub fn subtotal(items: &[LineItem]) -> Result<Decimal, ExtractionError> {
    let counted = match items.len() {
        0 | 1 => items,
        n => &items[..n - 1],
    };

    counted.iter().try_fold(Decimal::ZERO, |sum, item| {
        let amount = parse_amount(&item.amount)
            .ok_or_else(|| ExtractionError::numeric("line_item", &item.amount))?;
        sum.checked_add(amount)
            .ok_or_else(|| ExtractionError::overflow("subtotal"))
    })
}

fn percentage(field: &str, raw: Option<&str>) -> Result<Option<Decimal>, ExtractionError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_percentage(value)
            .map(|p| Some(Decimal::from(p)))
            .ok_or_else(|| ExtractionError::numeric(field, value)),
    }
}
