//! Fixed-layout CSV export (summary, line items, tax summary).

use super::{CURRENCY_SYMBOL, money};
use crate::models::invoice::{InvoiceRecord, LineItem};

/// Header row of the line item section.
pub const LINE_ITEMS_HEADER: &str = "Description,Amount,Category,Tax Rate";

pub(super) fn render(record: &InvoiceRecord) -> String {
    let tax = &record.tax_summary;
    let mut lines = vec![
        "Invoice Summary".to_string(),
        format!("Invoice Number,{}", text(&record.invoice_number)),
        format!("Date,{}", text(&record.invoice_date)),
        format!("Vendor,{}", text(&record.vendor_name)),
        format!("GSTIN,{}", text(&record.gstin)),
        format!("Total Amount,{}", money(record.total_amount, CURRENCY_SYMBOL)),
        String::new(),
        "Line Items".to_string(),
        LINE_ITEMS_HEADER.to_string(),
    ];

    lines.extend(record.line_items.iter().map(line_item_row));

    lines.extend([
        String::new(),
        "Tax Summary".to_string(),
        format!("Taxable Amount,{}", money(tax.total_taxable_amount, CURRENCY_SYMBOL)),
        format!("CGST,{}", money(tax.cgst, CURRENCY_SYMBOL)),
        format!("SGST,{}", money(tax.sgst, CURRENCY_SYMBOL)),
        format!("Total Tax,{}", money(tax.total_tax, CURRENCY_SYMBOL)),
        format!("Grand Total,{}", money(tax.grand_total, CURRENCY_SYMBOL)),
    ]);

    lines.join("\n")
}

fn line_item_row(item: &LineItem) -> String {
    format!(
        "{},{},{},{}",
        quote(item.description.as_deref().unwrap_or_default()),
        money(item.amount, CURRENCY_SYMBOL),
        item.category.as_ref().map(|c| c.as_str()).unwrap_or_default(),
        item.tax_rate.map(|r| format!("{r}%")).unwrap_or_default(),
    )
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
