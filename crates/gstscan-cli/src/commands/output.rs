//! Terminal-side delivery: export files, clipboard, notifications, report.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::ValueEnum;
use console::style;
use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use gstscan_core::export::{Clipboard, DownloadSink, ExportArtifact, ExportFormat};
use gstscan_core::invoice::{
    category_totals, is_validated, is_validated_with, line_figures, tax_consistency,
};
use gstscan_core::models::invoice::InvoiceRecord;
use gstscan_core::notify::{NotificationKind, NotificationQueue};
use gstscan_core::ExportError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON document with export metadata
    Json,
    /// CSV summary (opens in spreadsheet tools)
    #[value(alias = "excel")]
    Csv,
    /// Printable PDF
    Pdf,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Pdf => ExportFormat::Pdf,
        }
    }
}

/// Writes artifacts into a directory via a temp file + rename.
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        let target = self.dir.join(&artifact.filename);
        let fail = |reason: String| ExportError::Delivery {
            filename: artifact.filename.clone(),
            reason,
        };

        fs::create_dir_all(&self.dir).map_err(|e| fail(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| fail(e.to_string()))?;
        tmp.write_all(&artifact.bytes)
            .map_err(|e| fail(e.to_string()))?;
        tmp.persist(&target).map_err(|e| fail(e.error.to_string()))?;

        self.written.push(target);
        Ok(())
    }
}

/// Sets the clipboard through the OSC 52 terminal escape.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn set_text(&mut self, text: &str) -> std::io::Result<()> {
        if !console::Term::stdout().is_term() {
            return Err(std::io::Error::other("stdout is not a terminal"));
        }
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        stdout.flush()
    }
}

/// Print pending notifications to stderr.
pub fn print_notifications(queue: &mut NotificationQueue) {
    for note in queue.drain() {
        let marker = match note.kind {
            NotificationKind::Success => style("✓").green(),
            NotificationKind::Error => style("✗").red(),
            NotificationKind::Info => style("ℹ").blue(),
        };
        eprintln!("{} {}", marker, note.message);
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn amount(value: Option<f64>) -> String {
    value.map(|v| format!("₹{v}")).unwrap_or_else(|| "-".to_string())
}

/// Human-readable report of a record, including derived figures.
pub fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", text(&record.invoice_number)));
    output.push_str(&format!("Date: {}\n", text(&record.invoice_date)));
    output.push_str(&format!("Vendor: {}\n", text(&record.vendor_name)));
    output.push_str(&format!("GSTIN: {}\n", text(&record.gstin)));
    output.push_str(&format!("Total: {}\n", amount(record.total_amount)));
    output.push('\n');

    output.push_str("Line items:\n");
    if record.line_items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &record.line_items {
        let category = item.category.as_ref().map(|c| c.as_str()).unwrap_or("-");
        let rate = item
            .tax_rate
            .map(|r| format!("{r}%"))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "  {} [{}] {} @ {}",
            text(&item.description),
            category,
            amount(item.amount),
            rate
        ));
        if let Some(figures) = line_figures(item) {
            output.push_str(&format!(
                " -> tax ₹{}, total ₹{}",
                figures.tax_amount.round_dp(2),
                figures.line_total.round_dp(2)
            ));
        }
        output.push('\n');
    }

    let groups = category_totals(record);
    if !groups.is_empty() {
        output.push_str("\nBy category:\n");
        for group in groups {
            output.push_str(&format!(
                "  {}: ₹{} ({} items)\n",
                group.key,
                group.total.round_dp(2),
                group.count
            ));
        }
    }

    let tax = &record.tax_summary;
    output.push_str("\nTax summary:\n");
    output.push_str(&format!("  Taxable: {}\n", amount(tax.total_taxable_amount)));
    output.push_str(&format!("  CGST:    {}\n", amount(tax.cgst)));
    output.push_str(&format!("  SGST:    {}\n", amount(tax.sgst)));
    output.push_str(&format!("  Tax:     {}\n", amount(tax.total_tax)));
    output.push_str(&format!("  Grand:   {}\n", amount(tax.grand_total)));

    output
}

/// Print the validation signal and any tax inconsistencies.
pub fn print_validation(record: &InvoiceRecord, tolerance: f64) {
    let validated = match Decimal::try_from(tolerance) {
        Ok(tolerance) => is_validated_with(record, tolerance),
        Err(_) => is_validated(record),
    };

    if validated {
        eprintln!(
            "{} Extracted total matches predicted total",
            style("✓").green()
        );
    } else {
        eprintln!(
            "{} Extracted total differs from predicted total by {}% or more",
            style("⚠").yellow(),
            tolerance * 100.0
        );
    }

    let issues = tax_consistency(&record.tax_summary);
    if !issues.is_empty() {
        eprintln!("{}", style("Tax summary issues:").yellow());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }

    let missing = record.missing_fields();
    if !missing.is_empty() {
        eprintln!("{} Missing fields: {}", style("ℹ").blue(), missing.join(", "));
    }
}
