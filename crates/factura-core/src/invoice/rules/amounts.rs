//! Currency and percentage parsing.
//!
//! The numeric policy is narrow: `.` is the only decimal
//! separator, thousands separators are not understood, and percentages are
//! whole numbers. Anything else is a parse failure for the caller to report.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Symbols stripped from the front of a currency token.
pub const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£'];

/// Parse a currency token such as `€10.00`, `$ 5` or `52.00`.
///
/// At most one leading currency symbol is removed.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let s = s.strip_prefix(CURRENCY_SYMBOLS).unwrap_or(s).trim_start();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Parse an integer percentage such as `10` or ` 21 `.
pub fn parse_percentage(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// Format an amount with two decimals (e.g. `108.00`).
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
