//! Lenient mapping from the service's JSON reply to an [`InvoiceRecord`].
//!
//! Every target field is looked up along a fixed path; a missing segment
//! leaves the field empty instead of failing the whole mapping.

use serde_json::Value;
use tracing::debug;

use crate::models::invoice::{Category, InvoiceRecord, LineItem, TaxSummary};

/// Adapt a raw analysis response into an invoice record.
///
/// Pure and total: any JSON value, including `{}` or `null`, produces a
/// record.
pub fn adapt(raw: &Value) -> InvoiceRecord {
    let invoice = raw.get("invoice_data");
    let tax = raw.get("tax_data");
    let summary = lookup(tax, &["tax_summary"]);

    let record = InvoiceRecord {
        filename: text(raw.get("filename")),
        invoice_number: text(lookup(invoice, &["invoice_number"])),
        invoice_date: text(lookup(invoice, &["invoice_date"])),
        vendor_name: text(lookup(invoice, &["vendor_name"])),
        gstin: text(lookup(invoice, &["gstin"])),
        total_amount: number(lookup(invoice, &["total_amount"])),
        line_items: line_items(lookup(tax, &["line_items_with_tax"])),
        tax_summary: TaxSummary {
            total_taxable_amount: number(lookup(summary, &["total_taxable_amount"])),
            cgst: number(lookup(summary, &["tax_breakdown", "cgst"])),
            sgst: number(lookup(summary, &["tax_breakdown", "sgst"])),
            total_tax: number(lookup(summary, &["total_tax_amount"])),
            grand_total: number(lookup(tax, &["predicted_total"])),
        },
    };

    debug!(
        "Adapted response: {} line items, missing {:?}",
        record.line_items.len(),
        record.missing_fields()
    );

    record
}

fn lookup<'a>(root: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root?, |node, key| node.get(key))
}

fn line_items(value: Option<&Value>) -> Vec<LineItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| LineItem {
            description: text(item.get("description")),
            amount: number(item.get("amount")),
            category: item
                .get("category")
                .and_then(Value::as_str)
                .map(Category::from_label),
            tax_rate: number(item.get("tax_rate")),
        })
        .collect()
}

// Numeric invoice numbers show up upstream; keep their textual form.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full_response() -> Value {
        json!({
            "filename": "bill_1718000000.png",
            "raw_text": "TAX INVOICE ...",
            "invoice_data": {
                "invoice_number": "INV-2024-001",
                "invoice_date": "15/03/2024",
                "vendor_name": "Sharma Electronics",
                "gstin": "27AAPFU0939F1ZV",
                "total_amount": 1180.0
            },
            "tax_data": {
                "line_items_with_tax": [
                    {"description": "LED Monitor", "amount": 800.0, "category": "goods", "tax_rate": 18, "tax_amount": 144.0},
                    {"description": "Installation", "amount": 200.0, "category": "services", "tax_rate": 18, "tax_amount": 36.0}
                ],
                "tax_summary": {
                    "total_taxable_amount": 1000.0,
                    "total_tax_amount": 180.0,
                    "tax_breakdown": {"cgst": 90.0, "sgst": 90.0, "igst": 0.0}
                },
                "predicted_total": 1180.0
            }
        })
    }

    #[test]
    fn test_adapt_full_response() {
        let record = adapt(&full_response());

        assert_eq!(record.filename.as_deref(), Some("bill_1718000000.png"));
        assert_eq!(record.invoice_number.as_deref(), Some("INV-2024-001"));
        assert_eq!(record.invoice_date.as_deref(), Some("15/03/2024"));
        assert_eq!(record.vendor_name.as_deref(), Some("Sharma Electronics"));
        assert_eq!(record.gstin.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(record.total_amount, Some(1180.0));
        assert_eq!(
            record.line_items[1],
            LineItem {
                description: Some("Installation".to_string()),
                amount: Some(200.0),
                category: Some(Category::Services),
                tax_rate: Some(18.0),
            }
        );
        assert_eq!(
            record.tax_summary,
            TaxSummary {
                total_taxable_amount: Some(1000.0),
                cgst: Some(90.0),
                sgst: Some(90.0),
                total_tax: Some(180.0),
                grand_total: Some(1180.0),
            }
        );
    }

    #[test]
    fn test_adapt_empty_object() {
        let record = adapt(&json!({}));
        assert_eq!(record, InvoiceRecord::default());
        assert!(record.line_items.is_empty());
    }

    #[test]
    fn test_adapt_non_object_inputs() {
        for raw in [json!(null), json!([1, 2]), json!("text"), json!(42)] {
            assert_eq!(adapt(&raw), InvoiceRecord::default());
        }
    }

    #[test]
    fn test_adapt_partial_paths() {
        let raw = json!({
            "invoice_data": {"vendor_name": "Only Vendor"},
            "tax_data": {"tax_summary": {"total_tax_amount": 18.0}}
        });
        let record = adapt(&raw);

        assert_eq!(record.vendor_name.as_deref(), Some("Only Vendor"));
        assert_eq!(record.invoice_number, None);
        assert_eq!(record.tax_summary.total_tax, Some(18.0));
        assert_eq!(record.tax_summary.cgst, None);
        assert_eq!(record.tax_summary.grand_total, None);
    }

    #[test]
    fn test_non_array_line_items() {
        let raw = json!({"tax_data": {"line_items_with_tax": {"description": "x"}}});
        assert!(adapt(&raw).line_items.is_empty());
    }

    #[test]
    fn test_no_numeric_coercion() {
        let raw = json!({
            "invoice_data": {"invoice_number": 4711, "total_amount": "1,180.00"},
            "tax_data": {"line_items_with_tax": [{"amount": "abc", "category": "luxury"}]}
        });
        let record = adapt(&raw);

        assert_eq!(record.invoice_number.as_deref(), Some("4711"));
        assert_eq!(record.total_amount, None);
        assert_eq!(record.line_items[0].amount, None);
        assert_eq!(
            record.line_items[0].category,
            Some(Category::Other("luxury".to_string()))
        );
    }

    #[test]
    fn test_adapt_is_deterministic() {
        let raw = full_response();
        assert_eq!(adapt(&raw), adapt(&raw));
    }
}
