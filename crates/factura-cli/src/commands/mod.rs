//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod schema;

use std::fs;
use std::path::Path;

use factura_core::invoice::{parse_tokens, ExtractionResult, TokenSchema};
use factura_core::models::config::FacturaConfig;
use factura_core::pdf::PdfTextSource;
use factura_core::services::{PlainTextSource, RuleFieldService};
use factura_core::InvoicePipeline;

/// How a document is read, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// UTF-8 text, e.g. OCR output.
    Text,
    /// PDF with a text layer.
    Pdf,
    /// JSON token sequence from a layout parser.
    Tokens,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" | "text" => Some(DocumentKind::Text),
            "pdf" => Some(DocumentKind::Pdf),
            "json" => Some(DocumentKind::Tokens),
            _ => None,
        }
    }
}

/// Load the config from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FacturaConfig> {
    let config = match config_path {
        Some(path) => FacturaConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                FacturaConfig::from_file(&default_path)?
            } else {
                FacturaConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Reads any supported document into an [`ExtractionResult`].
///
/// Text and PDF documents go through an [`InvoicePipeline`] with the
/// configured catalog; token documents use the default label catalog.
pub struct DocumentReader {
    text: InvoicePipeline,
    pdf: InvoicePipeline,
    tokens: TokenSchema,
}

impl DocumentReader {
    /// Build from config, optionally overriding the catalog name.
    pub fn new(config: &FacturaConfig, schema: Option<&str>) -> anyhow::Result<Self> {
        let schema = match schema {
            Some(name) => config.build_schema_named(name)?,
            None => config.build_schema()?,
        };
        let fields = || {
            RuleFieldService::new(schema.clone())
                .with_totals(config.extraction.compute_totals)
        };

        Ok(Self {
            text: InvoicePipeline::new(Box::new(PlainTextSource), Box::new(fields())),
            pdf: InvoicePipeline::new(
                Box::new(PdfTextSource::new(config.pdf.min_text_length)),
                Box::new(fields()),
            ),
            tokens: TokenSchema::default(),
        })
    }

    pub fn read(&self, path: &Path, kind: DocumentKind) -> factura_core::Result<ExtractionResult> {
        let name = path.display().to_string();
        match kind {
            DocumentKind::Tokens => {
                let json = fs::read_to_string(path)?;
                let tokens = parse_tokens(&json)?;
                Ok(self.tokens.extract(&tokens))
            }
            DocumentKind::Text => self.text.process(&name, &fs::read(path)?).result,
            DocumentKind::Pdf => self.pdf.process(&name, &fs::read(path)?).result,
        }
    }
}
