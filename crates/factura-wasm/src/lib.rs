//! WASM bindings for invoice field extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! PDF reading is not available here; pass text or layout tokens.

use wasm_bindgen::prelude::*;

use factura_core::invoice::rules::parse_amount as parse_currency;
use factura_core::invoice::{
    FieldSchema, FieldSpec, InvoiceParser, TokenDocument, TokenSchema, ValueKind,
};
use factura_core::models::invoice::LineItem;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names of the built-in catalogs.
#[wasm_bindgen]
pub fn schemas() -> Vec<String> {
    factura_core::invoice::BUILTIN_SCHEMAS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Extract fields from text with a built-in catalog (default "invoice").
///
/// Returns `{ schema, fields, line_items?, totals? }`; missing fields are `null`.
#[wasm_bindgen]
pub fn extract_fields(text: &str, schema: Option<String>) -> Result<JsValue, JsValue> {
    let schema = FieldSchema::builtin(schema.as_deref().unwrap_or("invoice")).map_err(js_error)?;
    let result = schema.parse(text).map_err(js_error)?;
    to_js(&result)
}

/// Extract label/value pairs from layout tokens.
///
/// Accepts `[{ text, ... }]` or `{ texts: [...] }`.
#[wasm_bindgen]
pub fn extract_from_tokens(tokens: JsValue) -> Result<JsValue, JsValue> {
    let document: TokenDocument = serde_wasm_bindgen::from_value(tokens).map_err(js_error)?;
    let result = TokenSchema::default().extract(&document.into_tokens());
    to_js(&result)
}

/// Compute totals from item rows such as `"Logo design 2 50 €100.00"`.
///
/// The last of two or more rows is treated as the totals row and not counted.
#[wasm_bindgen]
pub fn compute_totals(
    rows: Vec<String>,
    discount: Option<String>,
    tax: Option<String>,
) -> Result<JsValue, JsValue> {
    let items = rows
        .iter()
        .map(|row| {
            LineItem::from_row(row).ok_or_else(|| js_error(format!("not a line item: {:?}", row)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let totals = factura_core::compute_totals(&items, discount.as_deref(), tax.as_deref())
        .map_err(js_error)?;
    to_js(&totals)
}

/// Parse a currency token (e.g., "€10.00").
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_currency(amount).and_then(|d| d.to_string().parse().ok())
}

/// Field extractor with a customizable catalog.
#[wasm_bindgen]
pub struct InvoiceExtractor {
    schema: FieldSchema,
}

#[wasm_bindgen]
impl InvoiceExtractor {
    /// Create an extractor starting from a built-in catalog.
    #[wasm_bindgen(constructor)]
    pub fn new(schema: Option<String>) -> Result<InvoiceExtractor, JsValue> {
        let schema = FieldSchema::builtin(schema.as_deref().unwrap_or("invoice")).map_err(js_error)?;
        Ok(Self {
            schema: schema.clone(),
        })
    }

    /// Append a field. `kind` is "text", "currency" or "percentage".
    #[wasm_bindgen]
    pub fn add_field(&mut self, name: &str, kind: &str, patterns: Vec<String>) -> Result<(), JsValue> {
        let kind: ValueKind = kind.parse().map_err(js_error)?;
        let spec = FieldSpec::new(name, kind, &patterns).map_err(js_error)?;
        self.schema.push(spec).map_err(js_error)
    }

    /// Field names in evaluation order.
    #[wasm_bindgen]
    pub fn field_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Extract fields and totals from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.schema.parse(text).map_err(js_error)?;
        to_js(&result)
    }
}
