//! Schema-driven invoice parsing.

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ExtractionError;
use crate::models::invoice::{InvoiceTotals, LineItem};

use super::matcher::{match_field, FieldValue};
use super::rules::{parse_amount, parse_percentage, FieldExtractor};
use super::schema::FieldSchema;
use super::totals::compute_totals;
use super::Result;

/// Field values resolved for one document, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Name of the schema that produced the fields.
    schema: String,
    /// Field name to value, in schema order.
    #[serde(serialize_with = "serialize_ordered")]
    fields: Vec<(String, FieldValue)>,
    /// Rows captured for the totals computation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    line_items: Vec<LineItem>,
    /// Computed totals, present when line items were captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    totals: Option<InvoiceTotals>,
}

fn serialize_ordered<S: Serializer>(
    fields: &[(String, FieldValue)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl ExtractionResult {
    /// Empty result for the named schema.
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            fields: Vec::new(),
            line_items: Vec::new(),
            totals: None,
        }
    }

    /// Record a field value. A repeated name replaces the earlier value in place.
    pub fn push(&mut self, name: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Value of a field; `None` if the schema has no such field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Captured text of a field that was found.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_deref)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Names of fields no rule matched.
    pub fn missing(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_found())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|(_, v)| v.is_found()).count()
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn totals(&self) -> Option<&InvoiceTotals> {
        self.totals.as_ref()
    }

    pub fn set_line_items(&mut self, items: Vec<LineItem>) {
        self.line_items = items;
    }

    pub fn set_totals(&mut self, totals: InvoiceTotals) {
        self.totals = Some(totals);
    }

    /// A found field parsed as a currency amount.
    pub fn currency(&self, name: &str) -> Result<Option<Decimal>> {
        self.value(name)
            .map(|raw| parse_amount(raw).ok_or_else(|| ExtractionError::numeric(name, raw)))
            .transpose()
    }

    /// A found field parsed as an integer percentage.
    pub fn percentage(&self, name: &str) -> Result<Option<i64>> {
        self.value(name)
            .map(|raw| parse_percentage(raw).ok_or_else(|| ExtractionError::numeric(name, raw)))
            .transpose()
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields and totals from text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

impl FieldSchema {
    /// Resolve every field, without computing totals.
    ///
    /// Never fails: fields that do not match are [`FieldValue::NotFound`].
    pub fn match_fields(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::new(self.name());
        for spec in self.fields() {
            result.push(spec.name(), match_field(text, spec.rule()));
        }
        result
    }
}

impl InvoiceParser for FieldSchema {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let mut result = self.match_fields(text);

        let Some(binding) = self.totals() else {
            return Ok(result);
        };

        let items = binding.items().extract_all(text);
        if !items.is_empty() {
            let discount = binding.discount_field().and_then(|f| result.value(f));
            let tax = binding.tax_field().and_then(|f| result.value(f));
            let totals = compute_totals(&items, discount, tax)?;
            result.set_totals(totals);
        }
        result.set_line_items(items);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const STRUCTURED_PDF: &str = "INVOICE # 1042\n\
        Date: 12/03/2024\n\
        Bill To: Northwind Traders\n\
        Item Qty Rate Amount\n\
        Logo design 1 250 €250.00\n\
        Business cards 2 25 €50.00\n\
        Subtotal 3 0 €300.00\n\
        Discount (10%) | Tax (20%)\n\
        Notes: Thank you for your business\n\
        Terms: Payment due in 30 days\n";

    const SCANNED_OCR: &str = "FACTURA\n\
        Fecha: 20/02/2021   Numero: 10940\n\
        Cliente: jhael Paola Usatarez Avila\n\
        Domicilio: Av. Sucre y 6 de octubre N° 567\n\
        Ciudad: Oruro\n\
        DNI/NIF: 3540679019\n\
        Publicidad en radio local mes de febrero\n\
        SUBTOTAL: 52.00\n\
        IVA 21%: 10.92\n\
        TOTAL A PAGAR: 62.92\n";

    #[test]
    fn test_parse_structured_pdf_text() {
        let result = FieldSchema::invoice().parse(STRUCTURED_PDF).unwrap();

        assert_eq!(result.schema(), "invoice");
        assert_eq!(result.value("invoice_number"), Some("1042"));
        assert_eq!(result.value("date"), Some("12/03/2024"));
        assert_eq!(result.value("client"), Some("Northwind Traders"));
        assert_eq!(result.value("discount"), Some("10"));
        assert_eq!(result.value("tax"), Some("20"));
        assert_eq!(result.value("notes"), Some("Thank you for your business"));
        assert_eq!(result.value("terms"), Some("Payment due in 30 days"));

        assert_eq!(result.line_items().len(), 3);
        let totals = result.totals().unwrap();
        assert_eq!(totals.subtotal, Decimal::from(300));
        assert_eq!(totals.discounted_total, Decimal::from(270));
        assert_eq!(totals.final_total, Decimal::from(324));
    }

    #[test]
    fn test_parse_scanned_ocr_text() {
        let result = FieldSchema::scanned().parse(SCANNED_OCR).unwrap();

        assert_eq!(result.value("fecha"), Some("20/02/2021"));
        assert_eq!(result.value("numero"), Some("10940"));
        assert_eq!(result.value("cliente"), Some("jhael Paola Usatarez Avila"));
        assert_eq!(result.value("domicilio"), Some("Av. Sucre y 6 de octubre N° 567"));
        assert_eq!(result.value("ciudad"), Some("Oruro"));
        assert_eq!(result.value("nif"), Some("3540679019"));
        assert_eq!(
            result.value("concepto"),
            Some("Publicidad en radio local mes de febrero")
        );
        assert_eq!(result.value("subtotal"), Some("52.00"));
        assert_eq!(result.value("iva"), Some("21"));
        assert_eq!(result.value("total_a_pagar"), Some("62.92"));
        assert!(result.totals().is_none());
        assert!(result.missing().is_empty());
    }

    #[test]
    fn test_unanchored_label_matches_inside_words() {
        // "Bolivar" contains "iva"; the first alternative wins there.
        let text = "Domicilio: C.Bolivar y 6 de octubre\nIVA 21%: 10.92\n";
        let result = FieldSchema::scanned().parse(text).unwrap();

        assert_eq!(result.value("iva"), Some("6"));
    }

    #[test]
    fn test_invoice_number_label_is_a_whole_word() {
        let schema = FieldSchema::invoice();

        let result = schema.match_fields("Invoice Notes: pay soon\nInvoice No. A-17\n");
        assert_eq!(result.value("invoice_number"), Some("A-17"));

        let result = schema.match_fields("Invoice Nov 2024\n");
        assert_eq!(result.value("invoice_number"), None);

        let result = schema.match_fields("Factura Nota interna\nFactura Nº F-2024/7\n");
        assert_eq!(result.value("invoice_number"), Some("F-2024/7"));
    }

    #[test]
    fn test_missing_fields_do_not_block_others() {
        let result = FieldSchema::scanned().parse("Cliente: ACME\nTOTAL: 10.00").unwrap();

        assert_eq!(result.value("cliente"), Some("ACME"));
        assert_eq!(result.value("total_a_pagar"), Some("10.00"));
        assert_eq!(result.get("fecha"), Some(&FieldValue::NotFound));
        assert_eq!(result.found_count(), 2);
        assert_eq!(result.get("unknown"), None);
    }

    #[test]
    fn test_empty_text_is_all_not_found() {
        let result = FieldSchema::invoice().parse("").unwrap();

        assert_eq!(result.found_count(), 0);
        assert_eq!(result.missing().len(), 9);
        assert!(result.totals().is_none());
    }

    #[test]
    fn test_bad_percentage_fails_parse() {
        let text = "Logo 1 1 €10.00\nTax (7.5%)\nIVA (7.5%)";
        let schema = FieldSchema::new("t")
            .with_field("tax", crate::invoice::ValueKind::Percentage, [r"Tax\s*\(([\d.]+)%\)"])
            .unwrap()
            .with_totals(
                crate::invoice::TotalsBinding::new(crate::invoice::rules::LineItemRule::new())
                    .with_tax("tax"),
            )
            .unwrap();

        let err = schema.parse(text).unwrap_err();
        assert!(matches!(err, ExtractionError::NumericParse { ref field, .. } if field == "tax"));

        // Field matching alone still succeeds.
        assert_eq!(schema.match_fields(text).value("tax"), Some("7.5"));
    }

    #[test]
    fn test_typed_accessors() {
        let result = FieldSchema::scanned().parse(SCANNED_OCR).unwrap();

        assert_eq!(
            result.currency("total_a_pagar").unwrap(),
            Some(Decimal::from_str("62.92").unwrap())
        );
        assert_eq!(result.percentage("iva").unwrap(), Some(21));
        assert_eq!(result.currency("missing").unwrap(), None);

        let mut comma = ExtractionResult::new("t");
        comma.push("total", FieldValue::Found("52,00".into()));
        assert!(comma.currency("total").is_err());
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let result = FieldSchema::scanned().parse("Numero: 7").unwrap();
        let json = serde_json::to_string(&result).unwrap();

        let fecha = json.find("\"fecha\"").unwrap();
        let numero = json.find("\"numero\"").unwrap();
        let total = json.find("\"total_a_pagar\"").unwrap();
        assert!(fecha < numero && numero < total);
        assert!(json.contains("\"fecha\":null"));
        assert!(json.contains("\"numero\":\"7\""));
        assert!(!json.contains("line_items"));
    }
}
