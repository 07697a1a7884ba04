//! Schema command - show the fields a catalog extracts.

use clap::Args;
use console::style;
use serde_json::json;

use factura_core::invoice::{FieldSchema, TokenSchema, BUILTIN_SCHEMAS};

use super::extract::OutputFormat;
use super::load_config;

/// Arguments for the schema command.
#[derive(Args)]
pub struct SchemaArgs {
    /// Catalog name ("invoice", "scanned" or "tokens"; default: configured)
    #[arg(short, long)]
    name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// List catalog names only
    #[arg(long)]
    list: bool,
}

pub async fn run(args: SchemaArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if args.list {
        for name in BUILTIN_SCHEMAS.iter().copied().chain([TokenSchema::NAME]) {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    let name = args.name.as_deref().unwrap_or(&config.extraction.schema);

    let output = if name == TokenSchema::NAME {
        format_tokens(&TokenSchema::default(), args.format)?
    } else {
        format_schema(&config.build_schema_named(name)?, args.format)?
    };
    print!("{}", output);

    Ok(())
}

fn format_schema(schema: &FieldSchema, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let fields: Vec<_> = schema
                .fields()
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name(),
                        "kind": f.kind(),
                        "patterns": f.rule().patterns().collect::<Vec<_>>(),
                    })
                })
                .collect();
            let totals = schema.totals().map(|t| {
                json!({
                    "line_item_pattern": t.items().pattern(),
                    "discount": t.discount_field(),
                    "tax": t.tax_field(),
                })
            });
            let value = json!({ "name": schema.name(), "fields": fields, "totals": totals });
            Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
        OutputFormat::Text => {
            let mut output = format!("{} {}\n", style("Schema:").bold(), schema.name());
            for (i, field) in schema.fields().iter().enumerate() {
                output.push_str(&format!(
                    "\n{}. {} ({:?})\n",
                    i + 1,
                    style(field.name()).cyan(),
                    field.kind()
                ));
                for pattern in field.rule().patterns() {
                    output.push_str(&format!("     {}\n", pattern));
                }
            }
            if let Some(totals) = schema.totals() {
                output.push_str(&format!(
                    "\n{} items {}, discount {}, tax {}\n",
                    style("Totals:").bold(),
                    totals.items().pattern(),
                    totals.discount_field().unwrap_or("-"),
                    totals.tax_field().unwrap_or("-"),
                ));
            }
            Ok(output)
        }
    }
}

fn format_tokens(schema: &TokenSchema, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let fields: Vec<_> = schema
                .labels()
                .map(|(field, label)| json!({ "name": field, "label": label }))
                .collect();
            let value = json!({ "name": TokenSchema::NAME, "fields": fields });
            Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
        OutputFormat::Text => {
            let mut output = format!("{} {}\n\n", style("Schema:").bold(), TokenSchema::NAME);
            for (field, label) in schema.labels() {
                output.push_str(&format!("  {:<16} {:?}\n", field, label));
            }
            Ok(output)
        }
    }
}
