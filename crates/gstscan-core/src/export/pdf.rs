//! Plain single-font PDF export built with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::{Result, money};
use crate::error::ExportError;
use crate::models::invoice::InvoiceRecord;

// Standard Type1 fonts have no rupee glyph.
const PDF_CURRENCY: &str = "INR ";

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 10;
const LEADING: i64 = 14;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

pub(super) fn render(record: &InvoiceRecord) -> Result<Vec<u8>> {
    let lines = document_lines(record);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let page_id = add_page(&mut doc, pages_id, chunk)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(bytes)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[String]) -> Result<ObjectId> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(ascii(line))]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations }
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

fn document_lines(record: &InvoiceRecord) -> Vec<String> {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let tax = &record.tax_summary;

    let mut lines = vec![
        "Invoice Summary".to_string(),
        String::new(),
        format!("Invoice Number: {}", field(&record.invoice_number)),
        format!("Date:           {}", field(&record.invoice_date)),
        format!("Vendor:         {}", field(&record.vendor_name)),
        format!("GSTIN:          {}", field(&record.gstin)),
        format!("Total Amount:   {}", money(record.total_amount, PDF_CURRENCY)),
        String::new(),
        "Line Items".to_string(),
        format!("{:<40} {:>14} {:<10} {:>8}", "Description", "Amount", "Category", "Tax Rate"),
    ];

    for item in &record.line_items {
        lines.push(format!(
            "{:<40} {:>14} {:<10} {:>8}",
            truncate(item.description.as_deref().unwrap_or_default(), 40),
            money(item.amount, PDF_CURRENCY),
            item.category.as_ref().map(|c| c.as_str()).unwrap_or_default(),
            item.tax_rate.map(|r| format!("{r}%")).unwrap_or_default(),
        ));
    }

    lines.extend([
        String::new(),
        "Tax Summary".to_string(),
        format!("Taxable Amount: {}", money(tax.total_taxable_amount, PDF_CURRENCY)),
        format!("CGST:           {}", money(tax.cgst, PDF_CURRENCY)),
        format!("SGST:           {}", money(tax.sgst, PDF_CURRENCY)),
        format!("Total Tax:      {}", money(tax.total_tax, PDF_CURRENCY)),
        format!("Grand Total:    {}", money(tax.grand_total, PDF_CURRENCY)),
    ]);

    lines
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

fn ascii(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}
