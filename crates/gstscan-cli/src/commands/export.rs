//! Export command - re-export a saved analysis response without re-uploading.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use gstscan_core::export::{ExportFormat, copy_summary, export};
use gstscan_core::invoice::adapt;
use gstscan_core::notify::NotificationQueue;

use super::load_config;
use super::output::{
    DirectorySink, OutputFormat, TerminalClipboard, format_text, print_notifications,
    print_validation,
};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Saved analysis response (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Export formats (repeatable)
    #[arg(short, long, value_enum)]
    format: Vec<OutputFormat>,

    /// Directory for exported files (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the invoice report to stdout
    #[arg(long)]
    print: bool,

    /// Copy a short summary to the clipboard
    #[arg(long)]
    copy: bool,

    /// Check extracted totals against the predicted totals
    #[arg(long)]
    validate: bool,
}

pub fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", args.input.display(), e))?;
    let raw: serde_json::Value = serde_json::from_str(&content)?;
    let record = adapt(&raw);
    info!(
        "Loaded invoice {} from {}",
        record.export_id(),
        args.input.display()
    );

    if args.validate {
        print_validation(&record, config.validation.tolerance);
    }

    if args.print {
        println!("{}", format_text(&record));
    }

    let formats: Vec<ExportFormat> = if args.format.is_empty() {
        vec![config.export.default_format]
    } else {
        args.format.into_iter().map(Into::into).collect()
    };

    let mut notifications = NotificationQueue::new();
    let mut sink = DirectorySink::new(
        args.output_dir
            .unwrap_or_else(|| config.export.output_dir.clone()),
    );

    let mut failures = 0;
    for format in formats {
        if export(&record, format, &mut sink, &mut notifications).is_err() {
            failures += 1;
        }
    }

    if args.copy {
        copy_summary(&record, &mut TerminalClipboard, &mut notifications);
    }

    for path in sink.written() {
        println!("{}", path.display());
    }
    print_notifications(&mut notifications);

    if failures > 0 {
        anyhow::bail!("{} export(s) failed", failures);
    }

    Ok(())
}
