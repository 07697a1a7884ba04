//! Batch processing command for multiple documents.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use factura_core::invoice::ExtractionResult;

use super::extract::{format_result, OutputFormat};
use super::{load_config, DocumentKind, DocumentReader};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Write one output file per document into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Field catalog to use instead of the configured one
    #[arg(short, long)]
    schema: Option<String>,

    /// Number of parallel workers (default: batch.jobs from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Result<ExtractionResult, String>,
    processing_time_ms: u64,
}

/// One JSON line of batch output.
#[derive(Serialize)]
struct BatchRecord<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);

    // Expand glob pattern
    let files: Vec<(PathBuf, DocumentKind)> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| DocumentKind::from_path(&p).map(|kind| (p, kind)))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        check_output_names(&files, args.format)?;
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let reader = Arc::new(DocumentReader::new(&config, args.schema.as_deref())?);

    let mut pending = stream::iter(files)
        .map(|(path, kind)| {
            let reader = Arc::clone(&reader);
            let worker_path = path.clone();
            process_blocking(path, move || {
                reader.read(&worker_path, kind).map_err(|e| e.to_string())
            })
        })
        .buffer_unordered(jobs);

    let mut results = Vec::new();
    while let Some(processed) = pending.next().await {
        if let Err(e) = &processed.result {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", processed.path.display(), e);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", processed.path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", processed.path.display(), e);
            }
        }
        results.push(processed);
        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();
    results.sort_by(|a, b| a.path.cmp(&b.path));

    for processed in &results {
        write_result(processed, &args)?;
    }

    let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
    let successful = results.len() - failed.len();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for processed in &failed {
            if let Err(e) = &processed.result {
                eprintln!("  - {}: {}", processed.path.display(), e);
            }
        }
    }

    Ok(())
}

/// Run one document on the blocking pool. A panicking worker becomes a
/// failed result for that file only.
async fn process_blocking<F>(path: PathBuf, work: F) -> ProcessResult
where
    F: FnOnce() -> Result<ExtractionResult, String> + Send + 'static,
{
    let file_start = Instant::now();
    let result = tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(format!("worker failed: {}", e)));

    ProcessResult {
        path,
        result,
        processing_time_ms: file_start.elapsed().as_millis() as u64,
    }
}

/// Output file name for one document: the full source name plus the format
/// extension, so `inv.txt` and `inv.pdf` stay apart.
fn output_name(path: &Path, format: OutputFormat) -> String {
    let source = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Text => "txt",
    };
    format!("{}.{}", source, extension)
}

/// Refuse to start when two inputs would write the same output file.
fn check_output_names(files: &[(PathBuf, DocumentKind)], format: OutputFormat) -> anyhow::Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for (path, _) in files {
        if let Some(previous) = seen.insert(output_name(path, format), path) {
            anyhow::bail!(
                "Output name collision: {} and {} both write {}",
                previous.display(),
                path.display(),
                output_name(path, format)
            );
        }
    }
    Ok(())
}

fn write_result(processed: &ProcessResult, args: &BatchArgs) -> anyhow::Result<()> {
    if let Some(output_dir) = &args.output_dir {
        let Ok(result) = &processed.result else {
            return Ok(());
        };
        let output_path = output_dir.join(output_name(&processed.path, args.format));
        fs::write(&output_path, format_result(result, args.format)?)?;
        debug!("Wrote output to {}", output_path.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let record = BatchRecord {
                file: processed.path.display().to_string(),
                result: processed.result.as_ref().ok(),
                error: processed.result.as_ref().err().map(String::as_str),
                processing_time_ms: processed.processing_time_ms,
            };
            println!("{}", serde_json::to_string(&record)?);
        }
        OutputFormat::Text => {
            println!("== {}", processed.path.display());
            match &processed.result {
                Ok(result) => println!("{}", format_result(result, OutputFormat::Text)?),
                Err(e) => println!("error: {}\n", e),
            }
        }
    }

    Ok(())
}
