//! Pattern tables for the built-in field catalogs.
//!
//! Each table lists the alternatives for one field in priority order. Every
//! entry has exactly one capture group. The tables are compiled by
//! [`FieldSchema`](crate::invoice::FieldSchema) with case-insensitive and
//! dot-all matching, so `(.+?)\n` may not be written as `.+?$`.
//!
//! OCR output routinely drops accents and confuses vowels, hence classes
//! like `N[uú]mero` and `F[ea]ch?a`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Line items: description, quantity, unit price, line total with currency.
    // Compiled without case folding or dot-all.
    pub static ref LINE_ITEM: Regex = Regex::new(
        r"(.*?)\s*(\d+)\s*(\d+)\s*([€$£]\d+\.\d{2})"
    ).unwrap();

    // Day-first dates: 20/02/2021, 1-3-21, 05.11.2023
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})$"
    ).unwrap();
}

// ---------------------------------------------------------------------------
// "scanned" catalog: Spanish invoices read by OCR
// ---------------------------------------------------------------------------

pub const FECHA: &[&str] = &[
    r"F[ea]ch?a[:\s]+(\d{1,2}[/\-\.]\d{1,2}[/\-\.]\d{2,4})",
    r"(\d{2}[/\-\.]\d{2}[/\-\.]\d{4})",
];

pub const NUMERO: &[&str] = &[
    r"N[uú]mero[:\s]+(\d+)",
    r"Numero[:\s]+(\d+)",
];

pub const CLIENTE: &[&str] = &[
    r"Cliente[:\s]+([^\n]+?)(?:\n|Domicilio)",
    r"Cliente[:\s]+(.+?)\n",
];

pub const DOMICILIO: &[&str] = &[
    r"Domicilio[:\s]+([^\n]+?)(?:\n|Ciudad)",
    r"Dom[ie]cilio[:\s]+(.+?)\n",
];

pub const CIUDAD: &[&str] = &[
    r"Ciudad[:\s]+([^\n]+?)(?:\n|DNI|NIF)",
    r"Ciudad[:\s]+(.+?)\n",
];

pub const NIF: &[&str] = &[
    r"DNI[/\s]?NIF[:\s]+([A-Z0-9]+)",
    r"IE\s+([A-Z0-9]{7,})",
];

pub const CONCEPTO: &[&str] = &[
    r"(Publicidad[^\n]+)(?:\n|$)",
];

pub const SUBTOTAL_ES: &[&str] = &[
    r"SUBTOTAL[:\s]+([\d.,]+)",
    r"(?:SUBTOTAL|Subtotal)[:\s]*([\d\s.,]+?)(?:\n|IVA)",
];

pub const IVA: &[&str] = &[
    r"IVA[^0-9]+([\d.,]+)",
    r"(?:IVA|iva)[^\d]+([\d\s.,]+?)\n",
];

pub const TOTAL_A_PAGAR: &[&str] = &[
    r"TOTAL\s*A?\s*PAGAR[:\s]+([\d.,]+)",
    r"TOTAL[:\s]+([\d.,]+)",
];

// ---------------------------------------------------------------------------
// "invoice" catalog: canonical fields, English layout first, Spanish after
// ---------------------------------------------------------------------------

pub const DATE: &[&str] = &[
    r"Invoice\s*Date\s*:?\s*(\d{1,2}[/\-\.]\d{1,2}[/\-\.]\d{2,4})",
    r"(?:^|\n)[ \t]*Date\s*:\s*(\d{1,2}[/\-\.]\d{1,2}[/\-\.]\d{2,4})",
    r"F[ea]ch?a[:\s]+(\d{1,2}[/\-\.]\d{1,2}[/\-\.]\d{2,4})",
    r"(\d{2}[/\-\.]\d{2}[/\-\.]\d{4})",
];

pub const INVOICE_NUMBER: &[&str] = &[
    r"INVOICE\s*#\s*(\d+)",
    r"Invoice\s*(?:No\b\.?|Number)\s*:?\s*([A-Z0-9][A-Z0-9/\-]*)",
    r"Factura\s*(?:N[º°]\.?|No\b\.?|#)\s*([A-Z0-9][A-Z0-9/\-]*)",
    r"N[uú]mero[:\s]+(\d+)",
];

pub const CLIENT: &[&str] = &[
    r"Bill\s*To\s*:\s*([^\n]*)",
    r"Client\s*:\s*([^\n]+)",
    r"Cliente[:\s]+([^\n]+?)(?:\n|Domicilio)",
    r"Cliente[:\s]+(.+?)\n",
];

pub const SUBTOTAL: &[&str] = &[
    r"SUBTOTAL[:\s]+([€$£]?[\d.,]+)",
    r"Sub-?total[:\s]*([€$£]?[\d\s.,]+?)(?:\n|IVA|Tax)",
];

pub const TAX: &[&str] = &[
    r"Discount\s*\(\d+%\)\s*\|\s*Tax\s*\((\d+)%\)",
    r"Tax\s*\((\d+)\s*%\)",
    r"IVA\s*\(?(\d+)\s*%",
];

pub const DISCOUNT: &[&str] = &[
    r"Discount\s*\((\d+)%\)\s*\|\s*Tax\s*\(\d+%\)",
    r"Discount\s*\((\d+)\s*%\)",
    r"Descuento\s*\(?(\d+)\s*%",
];

pub const TOTAL: &[&str] = &[
    r"TOTAL\s*A?\s*PAGAR[:\s]+([€$£]?[\d.,]+)",
    r"Total\s*Due\s*:?\s*([€$£]?[\d.,]+)",
    r"\bTOTAL[:\s]+([€$£]?[\d.,]+)",
];

pub const NOTES: &[&str] = &[
    r"Notes\s*:\s*(.*?)\s*Terms\s*:",
    r"Notes\s*:\s*([^\n]+)",
    r"Notas\s*:\s*([^\n]+)",
];

pub const TERMS: &[&str] = &[
    r"Terms\s*:\s*([^\n]*)",
    r"T[ée]rminos\s*:\s*([^\n]+)",
];
