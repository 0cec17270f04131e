//! Check command - run upload intake checks without contacting the service.

use std::path::PathBuf;

use clap::Args;
use console::style;

use gstscan_core::GstScanError;
use gstscan_core::intake::FileIntake;

use super::load_config;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// File to check (JPG, PNG or PDF)
    #[arg(required = true)]
    input: PathBuf,
}

pub fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut intake = FileIntake::with_limit(config.intake.max_file_size);

    match intake.select_path(&args.input) {
        Ok(selection) => {
            println!(
                "{} {} accepted ({}, {:.2} MB)",
                style("✓").green(),
                selection.file.name,
                selection.file.mime,
                selection.file.size() as f64 / 1024.0 / 1024.0
            );
            Ok(())
        }
        Err(GstScanError::Intake(e)) => {
            anyhow::bail!("{} rejected: {} ({})", args.input.display(), e, e.reason())
        }
        Err(e) => Err(e.into()),
    }
}
