//! Export pipeline: serialize a record into a downloadable artifact.
//!
//! Rendering is pure and deterministic for a given timestamp; delivery goes
//! through a [`DownloadSink`] and every attempt ends in exactly one
//! notification.

mod clipboard;
mod csv;
mod json;
mod pdf;

pub use clipboard::{clipboard_summary, copy_summary, Clipboard};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ExportError;
use crate::models::invoice::InvoiceRecord;
use crate::notify::{NotificationKind, Notifier};

/// Currency symbol prefixed to amounts in text exports.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Notification shown for any failed export.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to export file. Please try again.";

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    /// Spreadsheet-friendly text; `excel` is accepted as an alias.
    #[serde(alias = "excel")]
    Csv,
    Pdf,
}

impl ExportFormat {
    /// Tag written into JSON exports.
    pub fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.tag()
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON file exported successfully",
            ExportFormat::Csv => "CSV file exported successfully",
            ExportFormat::Pdf => "PDF file exported successfully",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" | "excel" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A rendered export, ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Destination for rendered artifacts (browser download, directory, ...).
pub trait DownloadSink {
    /// Hand the artifact over. Must not leave a partial file behind on error.
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()>;
}

/// Filename for an export of `record` in `format`.
pub fn export_filename(record: &InvoiceRecord, format: ExportFormat) -> String {
    format!("invoice_{}.{}", record.export_id(), format.extension())
}

/// Render `record` as `format`, stamping it with `exported_at`.
pub fn render(
    record: &InvoiceRecord,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Json => json::render(record, exported_at)?,
        ExportFormat::Csv => csv::render(record).into_bytes(),
        ExportFormat::Pdf => pdf::render(record)?,
    };

    Ok(ExportArtifact {
        filename: export_filename(record, format),
        mime: format.mime(),
        bytes,
    })
}

/// Render and deliver an export stamped with the current time.
pub fn export<S, N>(
    record: &InvoiceRecord,
    format: ExportFormat,
    sink: &mut S,
    notifier: &mut N,
) -> Result<String>
where
    S: DownloadSink + ?Sized,
    N: Notifier + ?Sized,
{
    export_at(record, format, Utc::now(), sink, notifier)
}

/// Render and deliver an export, notifying success or failure once.
///
/// Returns the delivered filename.
pub fn export_at<S, N>(
    record: &InvoiceRecord,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
    sink: &mut S,
    notifier: &mut N,
) -> Result<String>
where
    S: DownloadSink + ?Sized,
    N: Notifier + ?Sized,
{
    let outcome = render(record, format, exported_at)
        .and_then(|artifact| sink.deliver(&artifact).map(|()| artifact.filename));

    match outcome {
        Ok(filename) => {
            info!("Exported {}", filename);
            notifier.notify(format.success_message(), NotificationKind::Success);
            Ok(filename)
        }
        Err(e) => {
            warn!("Export as {} failed: {}", format, e);
            notifier.notify(EXPORT_FAILED_MESSAGE, NotificationKind::Error);
            Err(e)
        }
    }
}

/// Amount with a currency prefix; absent amounts render empty.
pub(crate) fn money(value: Option<f64>, symbol: &str) -> String {
    value.map(|v| format!("{symbol}{v}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{Category, LineItem, TaxSummary};
    use crate::notify::NotificationQueue;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    pub(super) fn sample_record() -> InvoiceRecord {
        InvoiceRecord {
            filename: Some("bill_1718000000.png".to_string()),
            invoice_number: Some("INV-2024-001".to_string()),
            invoice_date: Some("15/03/2024".to_string()),
            vendor_name: Some("Sharma Electronics".to_string()),
            gstin: Some("27AAPFU0939F1ZV".to_string()),
            total_amount: Some(1180.0),
            line_items: vec![
                LineItem {
                    description: Some("LED Monitor, 24\"".to_string()),
                    amount: Some(800.0),
                    category: Some(Category::Goods),
                    tax_rate: Some(18.0),
                },
                LineItem {
                    description: Some("Installation".to_string()),
                    amount: Some(200.5),
                    category: Some(Category::Services),
                    tax_rate: Some(18.0),
                },
            ],
            tax_summary: TaxSummary {
                total_taxable_amount: Some(1000.5),
                cgst: Some(90.05),
                sgst: Some(90.05),
                total_tax: Some(180.1),
                grand_total: Some(1180.6),
            },
        }
    }

    pub(super) fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    struct MemorySink {
        delivered: Vec<ExportArtifact>,
        fail: bool,
    }

    impl DownloadSink for MemorySink {
        fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()> {
            if self.fail {
                return Err(ExportError::Delivery {
                    filename: artifact.filename.clone(),
                    reason: "disk full".to_string(),
                });
            }
            self.delivered.push(artifact.clone());
            Ok(())
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("Excel".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("xlsx".parse::<ExportFormat>().is_err());

        let from_config: ExportFormat = serde_json::from_str(r#""excel""#).unwrap();
        assert_eq!(from_config, ExportFormat::Csv);
    }

    #[test]
    fn test_filenames() {
        let record = sample_record();
        assert_eq!(
            export_filename(&record, ExportFormat::Json),
            "invoice_INV-2024-001.json"
        );
        assert_eq!(
            export_filename(&InvoiceRecord::default(), ExportFormat::Csv),
            "invoice_export.csv"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = sample_record();
        for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Pdf] {
            let a = render(&record, format, fixed_time()).unwrap();
            let b = render(&record, format, fixed_time()).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.mime, format.mime());
        }
    }

    #[test]
    fn test_export_notifies_success_once() {
        let record = sample_record();
        let mut sink = MemorySink { delivered: Vec::new(), fail: false };
        let mut queue = NotificationQueue::new();

        let filename =
            export_at(&record, ExportFormat::Csv, fixed_time(), &mut sink, &mut queue).unwrap();

        assert_eq!(filename, "invoice_INV-2024-001.csv");
        assert_eq!(sink.delivered.len(), 1);
        let notes = queue.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, "CSV file exported successfully");
        assert_eq!(notes[0].kind, NotificationKind::Success);
    }

    #[test]
    fn test_export_failure_keeps_record() {
        let record = sample_record();
        let before = record.clone();
        let mut sink = MemorySink { delivered: Vec::new(), fail: true };
        let mut queue = NotificationQueue::new();

        let result = export_at(&record, ExportFormat::Pdf, fixed_time(), &mut sink, &mut queue);

        assert!(matches!(result, Err(ExportError::Delivery { .. })));
        assert!(sink.delivered.is_empty());
        assert_eq!(record, before);
        let notes = queue.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, EXPORT_FAILED_MESSAGE);
        assert_eq!(notes[0].kind, NotificationKind::Error);
    }

    #[test]
    fn test_money() {
        assert_eq!(money(Some(1180.0), CURRENCY_SYMBOL), "₹1180");
        assert_eq!(money(Some(90.05), "INR "), "INR 90.05");
        assert_eq!(money(None, CURRENCY_SYMBOL), "");
    }
}
