//! Process command - upload a single invoice and export the analysis.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use gstscan_core::export::{ExportFormat, copy_summary, export};
use gstscan_core::intake::FileIntake;
use gstscan_core::session::InvoiceSession;
use gstscan_core::{GstScanError, HttpAnalysisClient};

use super::load_config;
use super::output::{
    DirectorySink, OutputFormat, TerminalClipboard, format_text, print_notifications,
    print_validation,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (JPG, PNG or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Analysis endpoint (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Export format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory for exported files (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip writing an export file
    #[arg(long)]
    no_export: bool,

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

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(endpoint) = &args.endpoint {
        config.service.endpoint = endpoint.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut session =
        InvoiceSession::with_intake(FileIntake::with_limit(config.intake.max_file_size));

    match session.select_path(&args.input).map(|_| ()) {
        Ok(()) => {}
        Err(GstScanError::Intake(_)) => {
            print_notifications(session.notifications());
            anyhow::bail!("{} was not accepted for upload", args.input.display());
        }
        Err(e) => return Err(e.into()),
    }

    let client = HttpAnalysisClient::from_config(&config.service)?;
    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Analyzing invoice via {}...", client.endpoint()));
    pb.enable_steady_tick(Duration::from_millis(120));

    let outcome = session.process(&client).await;
    pb.finish_and_clear();

    let record = match outcome {
        Ok(record) => record.clone(),
        Err(e) => {
            debug!("Processing failed: {}", e);
            print_notifications(session.notifications());
            anyhow::bail!("analysis failed");
        }
    };

    if args.validate {
        print_validation(&record, config.validation.tolerance);
    }

    if args.print || args.no_export {
        println!("{}", format_text(&record));
    }

    let notifier = session.notifications();

    if !args.no_export {
        let format: ExportFormat = args
            .format
            .map(Into::into)
            .unwrap_or(config.export.default_format);
        let dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.export.output_dir.clone());

        let mut sink = DirectorySink::new(dir);
        if export(&record, format, &mut sink, notifier).is_ok() {
            for path in sink.written() {
                println!("{}", path.display());
            }
        }
    }

    if args.copy {
        copy_summary(&record, &mut TerminalClipboard, notifier);
    }

    print_notifications(notifier);
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
