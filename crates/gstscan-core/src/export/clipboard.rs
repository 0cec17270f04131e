//! Plain-text summary for the clipboard.

use tracing::warn;

use super::{CURRENCY_SYMBOL, money};
use crate::models::invoice::InvoiceRecord;
use crate::notify::{NotificationKind, Notifier};

/// Something that accepts text for the system clipboard.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// Six-line summary: number, date, vendor, amount, tax, total.
pub fn clipboard_summary(record: &InvoiceRecord) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    format!(
        "Invoice #{}\nDate: {}\nVendor: {}\nAmount: {}\nTax: {}\nTotal: {}",
        text(&record.invoice_number),
        text(&record.invoice_date),
        text(&record.vendor_name),
        money(record.total_amount, CURRENCY_SYMBOL),
        money(record.tax_summary.total_tax, CURRENCY_SYMBOL),
        money(record.tax_summary.grand_total, CURRENCY_SYMBOL),
    )
}

/// Copy the summary and report the outcome.
pub fn copy_summary<C, N>(record: &InvoiceRecord, clipboard: &mut C, notifier: &mut N) -> bool
where
    C: Clipboard + ?Sized,
    N: Notifier + ?Sized,
{
    match clipboard.set_text(&clipboard_summary(record)) {
        Ok(()) => {
            notifier.notify("Invoice summary copied to clipboard", NotificationKind::Success);
            true
        }
        Err(e) => {
            warn!("Failed to copy summary: {}", e);
            notifier.notify("Failed to copy to clipboard", NotificationKind::Error);
            false
        }
    }
}
