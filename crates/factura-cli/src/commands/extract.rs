//! Extract command - extract fields from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use factura_core::invoice::rules::amounts::format_amount;
use factura_core::invoice::ExtractionResult;

use super::{load_config, DocumentKind, DocumentReader};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.txt, .pdf or .json tokens)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Field catalog to use instead of the configured one
    #[arg(short, long)]
    schema: Option<String>,

    /// Read the input as a JSON token sequence whatever its extension
    #[arg(long)]
    tokens: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = if args.tokens {
        DocumentKind::Tokens
    } else {
        DocumentKind::from_path(&args.input).ok_or_else(|| {
            anyhow::anyhow!("Unsupported file format: {}", args.input.display())
        })?
    };

    info!("Processing file: {} as {:?}", args.input.display(), kind);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting fields...");

    let reader = DocumentReader::new(&config, args.schema.as_deref())?;
    let result = reader.read(&args.input, kind);
    pb.finish_and_clear();
    let result = result?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Schema: {}\n", result.schema()));
    let width = result
        .fields()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, value) in result.fields() {
        output.push_str(&format!("  {:width$}  {}\n", name, value, width = width));
    }

    if let Some(totals) = result.totals() {
        let totals = totals.rounded();
        output.push('\n');
        output.push_str(&format!("Line items: {}\n", result.line_items().len()));
        output.push_str(&format!("  Subtotal:         {}\n", format_amount(totals.subtotal)));
        output.push_str(&format!("  After discount:   {}\n", format_amount(totals.discounted_total)));
        output.push_str(&format!("  Total:            {}\n", format_amount(totals.final_total)));
    }

    output
}
