//! Scrape command - extract contacts from a directory of documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{Pattern, glob};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use roster_core::{ContactCollector, DocumentKind, Pipeline, PipelineReport};

use super::load_config;

/// Arguments for the scrape command.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Directory containing the input documents
    #[arg(short, long, default_value = "input_files")]
    input: PathBuf,

    /// Directory the output files are written to
    #[arg(short, long, default_value = "output_files")]
    output: PathBuf,

    /// Stop at the first document that cannot be read
    #[arg(long)]
    fail_fast: bool,

    /// List the lines that were not accepted as contacts
    #[arg(long)]
    show_rejected: bool,

    /// Also write a per-document summary CSV to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

pub async fn run(args: ScrapeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    // The summary counts rejected lines per document.
    if args.show_rejected || args.summary.is_some() {
        config.extraction.collect_rejections = true;
    }
    let pipeline = Pipeline::new(&config)?;

    if !args.input.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input.display());
    }
    let files = list_files(&args.input)?;

    let documents = files
        .iter()
        .filter(|p| matches!(DocumentKind::from_path(p), Ok(Some(_)) | Err(_)))
        .count();
    println!(
        "{} Found {} documents in {}",
        style("ℹ").blue(),
        documents,
        args.input.display()
    );

    fs::create_dir_all(&args.output)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut collector = ContactCollector::new();
    for path in &files {
        let outcome = pipeline.process_document(path);

        if args.fail_fast {
            if let Err(e) = &outcome {
                progress.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", path.display(), e);
            }
        }

        collector.add(path, outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let mut report = collector.finish();
    pipeline.write_outputs(&mut report, &args.output);

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&report, args.show_rejected);

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        report.documents.len() + report.failed_documents.len(),
        start.elapsed()
    );

    if report.outputs_succeeded() {
        println!(
            "Extraction complete. Files saved in: {}",
            args.output.display()
        );
        Ok(())
    } else {
        let failed: Vec<&str> = report.failed_outputs().map(|o| o.format.name()).collect();
        anyhow::bail!("Failed to write output: {}", failed.join(", "))
    }
}

/// Regular files directly inside `dir`, in path order.
fn list_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    debug!("Listing {}", pattern);

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn print_report(report: &PipelineReport, show_rejected: bool) {
    println!(
        "   {} contacts ({} duplicates removed), {} documents read, {} failed",
        style(report.contacts.len()).green(),
        report.duplicates(),
        report.documents.len(),
        style(report.failed_documents.len()).red()
    );

    if !report.failed_documents.is_empty() {
        println!();
        println!("{}", style("Failed documents:").red());
        for failed in &report.failed_documents {
            println!("  - {}: {}", failed.path.display(), failed.error);
        }
    }

    if show_rejected {
        let rejected: Vec<_> = report.rejected_lines().collect();
        if !rejected.is_empty() {
            println!();
            println!("{}", style("Rejected lines:").yellow());
            for (path, line) in rejected {
                println!(
                    "  - {}:{}: {} ({})",
                    path.display(),
                    line.line_number,
                    line.line,
                    line.reason
                );
            }
        }
    }

    println!();
    for output in &report.outputs {
        match &output.result {
            Ok(()) => println!(
                "{} {} -> {}",
                style("✓").green(),
                output.format,
                output.path.display()
            ),
            Err(e) => println!(
                "{} {} -> {}: {}",
                style("✗").red(),
                output.format,
                output.path.display(),
                e
            ),
        }
    }
}

fn write_summary(path: &Path, report: &PipelineReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "kind", "status", "records", "rejected", "error"])?;

    for doc in &report.documents {
        wtr.write_record([
            file_name(&doc.path),
            doc.kind.name(),
            "success",
            &doc.records.to_string(),
            &doc.rejected.len().to_string(),
            "",
        ])?;
    }

    for failed in &report.failed_documents {
        let kind = match DocumentKind::from_path(&failed.path) {
            Ok(Some(kind)) => kind.name(),
            _ => "",
        };
        wtr.write_record([
            file_name(&failed.path),
            kind,
            "error",
            "",
            "",
            &failed.error.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}
