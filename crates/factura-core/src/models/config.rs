//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FacturaError, Result};
use crate::invoice::{FieldSchema, FieldSpec, ValueKind};
use crate::services::RuleFieldService;

/// Main configuration for factura.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturaConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Built-in catalog to start from ("invoice" or "scanned").
    pub schema: String,

    /// Extra fields appended after the catalog's own.
    pub custom_fields: Vec<CustomField>,

    /// Capture line items and compute totals.
    pub compute_totals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            schema: "invoice".to_string(),
            custom_fields: Vec::new(),
            compute_totals: true,
        }
    }
}

/// A user-declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: ValueKind,

    /// Alternatives in priority order, one capture group each.
    pub patterns: Vec<String>,
}

fn default_kind() -> ValueKind {
    ValueKind::Text
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-blank characters for a PDF to count as having text.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Documents processed concurrently.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

impl FacturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured catalog with custom fields appended.
    pub fn build_schema(&self) -> Result<FieldSchema> {
        self.build_schema_named(&self.extraction.schema)
    }

    /// Like [`build_schema`](Self::build_schema), starting from another catalog.
    pub fn build_schema_named(&self, name: &str) -> Result<FieldSchema> {
        let mut schema = FieldSchema::builtin(name)?.clone();
        for field in &self.extraction.custom_fields {
            schema.push(FieldSpec::new(&field.name, field.kind, &field.patterns)?)?;
        }
        Ok(schema)
    }

    /// Field service for the configured catalog.
    pub fn field_service(&self) -> Result<RuleFieldService> {
        Ok(RuleFieldService::new(self.build_schema()?).with_totals(self.extraction.compute_totals))
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.batch.jobs == 0 {
            return Err(FacturaError::Config("batch.jobs must be at least 1".to_string()));
        }
        self.build_schema().map(|_| ())
    }
}
