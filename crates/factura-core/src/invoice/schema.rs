//! Field catalogs.
//!
//! A [`FieldSchema`] is the single source of truth for which fields exist,
//! what kind of value each holds and in which order its alternatives are
//! tried. Fields are kept in a `Vec`, so evaluation and output order never
//! depend on hashing.

use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

use super::matcher::FieldRule;
use super::rules::patterns::*;
use super::rules::LineItemRule;

/// Names of the built-in catalogs.
pub const BUILTIN_SCHEMAS: &[&str] = &["invoice", "scanned"];

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text.
    Text,
    /// Currency amount (`€10.00`, `52.00`).
    Currency,
    /// Whole-number percentage.
    Percentage,
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ValueKind::Text),
            "currency" => Ok(ValueKind::Currency),
            "percentage" => Ok(ValueKind::Percentage),
            other => Err(format!("unknown value kind: {}", other)),
        }
    }
}

/// A named field bound to its rule and value kind.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    kind: ValueKind,
    rule: FieldRule,
}

impl FieldSpec {
    pub fn new<I, S>(name: &str, kind: ValueKind, patterns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            name: name.to_string(),
            kind,
            rule: FieldRule::new(name, patterns)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn rule(&self) -> &FieldRule {
        &self.rule
    }
}

/// Which rows and fields feed the totals computation.
#[derive(Debug, Clone)]
pub struct TotalsBinding {
    items: LineItemRule,
    discount_field: Option<String>,
    tax_field: Option<String>,
}

impl TotalsBinding {
    pub fn new(items: LineItemRule) -> Self {
        Self {
            items,
            discount_field: None,
            tax_field: None,
        }
    }

    /// Field whose capture is the discount percentage.
    pub fn with_discount(mut self, field: &str) -> Self {
        self.discount_field = Some(field.to_string());
        self
    }

    /// Field whose capture is the tax percentage.
    pub fn with_tax(mut self, field: &str) -> Self {
        self.tax_field = Some(field.to_string());
        self
    }

    pub fn items(&self) -> &LineItemRule {
        &self.items
    }

    pub fn discount_field(&self) -> Option<&str> {
        self.discount_field.as_deref()
    }

    pub fn tax_field(&self) -> Option<&str> {
        self.tax_field.as_deref()
    }
}

/// Ordered catalog of fields.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    fields: Vec<FieldSpec>,
    totals: Option<TotalsBinding>,
}

impl FieldSchema {
    /// Create an empty schema.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            totals: None,
        }
    }

    /// Append a field built from its patterns.
    pub fn with_field<I, S>(mut self, name: &str, kind: ValueKind, patterns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push(FieldSpec::new(name, kind, patterns)?)?;
        Ok(self)
    }

    /// Bind the totals computation. Referenced fields must already exist.
    pub fn with_totals(mut self, binding: TotalsBinding) -> Result<Self, SchemaError> {
        for field in [binding.discount_field(), binding.tax_field()].into_iter().flatten() {
            if self.field(field).is_none() {
                return Err(SchemaError::UnknownField(field.to_string()));
            }
        }
        self.totals = Some(binding);
        Ok(self)
    }

    /// Append a field; names must be unique.
    pub fn push(&mut self, spec: FieldSpec) -> Result<(), SchemaError> {
        if self.field(spec.name()).is_some() {
            return Err(SchemaError::DuplicateField(spec.name().to_string()));
        }
        self.fields.push(spec);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in evaluation order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn totals(&self) -> Option<&TotalsBinding> {
        self.totals.as_ref()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical bilingual catalog with line-item totals.
    pub fn invoice() -> &'static FieldSchema {
        &INVOICE_SCHEMA
    }

    /// Spanish OCR catalog.
    pub fn scanned() -> &'static FieldSchema {
        &SCANNED_SCHEMA
    }

    /// Look up a built-in catalog by name.
    pub fn builtin(name: &str) -> Result<&'static FieldSchema, SchemaError> {
        match name {
            "invoice" => Ok(Self::invoice()),
            "scanned" => Ok(Self::scanned()),
            other => Err(SchemaError::UnknownSchema(other.to_string())),
        }
    }
}

fn build_invoice_schema() -> Result<FieldSchema, SchemaError> {
    FieldSchema::new("invoice")
        .with_field("date", ValueKind::Text, DATE)?
        .with_field("invoice_number", ValueKind::Text, INVOICE_NUMBER)?
        .with_field("client", ValueKind::Text, CLIENT)?
        .with_field("subtotal", ValueKind::Currency, SUBTOTAL)?
        .with_field("tax", ValueKind::Percentage, TAX)?
        .with_field("discount", ValueKind::Percentage, DISCOUNT)?
        .with_field("total", ValueKind::Currency, TOTAL)?
        .with_field("notes", ValueKind::Text, NOTES)?
        .with_field("terms", ValueKind::Text, TERMS)?
        .with_totals(
            TotalsBinding::new(LineItemRule::new())
                .with_discount("discount")
                .with_tax("tax"),
        )
}

fn build_scanned_schema() -> Result<FieldSchema, SchemaError> {
    FieldSchema::new("scanned")
        .with_field("fecha", ValueKind::Text, FECHA)?
        .with_field("numero", ValueKind::Text, NUMERO)?
        .with_field("cliente", ValueKind::Text, CLIENTE)?
        .with_field("domicilio", ValueKind::Text, DOMICILIO)?
        .with_field("ciudad", ValueKind::Text, CIUDAD)?
        .with_field("nif", ValueKind::Text, NIF)?
        .with_field("concepto", ValueKind::Text, CONCEPTO)?
        .with_field("subtotal", ValueKind::Currency, SUBTOTAL_ES)?
        .with_field("iva", ValueKind::Currency, IVA)?
        .with_field("total_a_pagar", ValueKind::Currency, TOTAL_A_PAGAR)
}

lazy_static! {
    static ref INVOICE_SCHEMA: FieldSchema = build_invoice_schema().unwrap();
    static ref SCANNED_SCHEMA: FieldSchema = build_scanned_schema().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_catalogs_build() {
        assert!(build_invoice_schema().is_ok());
        assert!(build_scanned_schema().is_ok());
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let names: Vec<&str> = FieldSchema::scanned().fields().iter().map(FieldSpec::name).collect();
        assert_eq!(
            names,
            vec![
                "fecha", "numero", "cliente", "domicilio", "ciudad", "nif", "concepto",
                "subtotal", "iva", "total_a_pagar"
            ]
        );
    }

    #[test]
    fn test_invoice_catalog_kinds() {
        let schema = FieldSchema::invoice();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema.field("tax").unwrap().kind(), ValueKind::Percentage);
        assert_eq!(schema.field("total").unwrap().kind(), ValueKind::Currency);
        assert_eq!(schema.totals().unwrap().discount_field(), Some("discount"));
        assert!(FieldSchema::scanned().totals().is_none());
    }

    #[test]
    fn test_builtin_lookup() {
        for name in BUILTIN_SCHEMAS {
            assert_eq!(FieldSchema::builtin(name).unwrap().name(), *name);
        }
        assert_eq!(
            FieldSchema::builtin("receipts").unwrap_err(),
            SchemaError::UnknownSchema("receipts".into())
        );
    }

    #[test]
    fn test_value_kind_from_str() {
        assert_eq!("Currency".parse::<ValueKind>(), Ok(ValueKind::Currency));
        assert_eq!(" percentage ".parse::<ValueKind>(), Ok(ValueKind::Percentage));
        assert!("money".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = FieldSchema::new("t")
            .with_field("a", ValueKind::Text, [r"a(\d)"])
            .and_then(|s| s.with_field("a", ValueKind::Text, [r"b(\d)"]))
            .unwrap_err();

        assert_eq!(err, SchemaError::DuplicateField("a".into()));
    }

    #[test]
    fn test_totals_binding_requires_known_fields() {
        let err = FieldSchema::new("t")
            .with_totals(TotalsBinding::new(LineItemRule::new()).with_tax("tax"))
            .unwrap_err();

        assert_eq!(err, SchemaError::UnknownField("tax".into()));
    }

    #[test]
    fn test_extending_a_catalog() {
        let mut schema = FieldSchema::invoice().clone();
        schema
            .push(FieldSpec::new("due_date", ValueKind::Text, [r"Due\s*Date\s*:?\s*(\S+)"]).unwrap())
            .unwrap();

        assert_eq!(schema.len(), 10);
        assert_eq!(schema.fields().last().unwrap().name(), "due_date");
        assert_eq!(FieldSchema::invoice().len(), 9);
    }
}
