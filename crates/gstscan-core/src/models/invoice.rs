//! Invoice view model produced from an analysis response.

use serde::{Deserialize, Serialize};

/// Display-ready invoice derived from one analysis response.
///
/// Absent upstream values stay `None` and are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceRecord {
    /// Name the service stored the upload under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Invoice number/identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Invoice date as printed on the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,

    /// Vendor (seller) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,

    /// Vendor GST identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,

    /// Total extracted from the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,

    /// Line items with predicted tax rates.
    pub line_items: Vec<LineItem>,

    /// Tax totals predicted by the service.
    pub tax_summary: TaxSummary,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    /// Product/service description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Taxable amount for this line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    /// GST category assigned by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// GST rate in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
}

/// GST category of a line item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goods,
    Services,
    Exempt,
    /// Category string the service introduced that we have no variant for.
    #[serde(untagged)]
    Other(String),
}

impl Category {
    /// Parse a category label, keeping unknown labels verbatim.
    pub fn from_label(label: &str) -> Self {
        match label {
            "goods" => Category::Goods,
            "services" => Category::Services,
            "exempt" => Category::Exempt,
            other => Category::Other(other.to_string()),
        }
    }

    /// The literal label, as received.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Goods => "goods",
            Category::Services => "services",
            Category::Exempt => "exempt",
            Category::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tax totals for the invoice.
///
/// The service is expected to keep `total_tax ≈ cgst + sgst` and
/// `grand_total ≈ total_taxable_amount + total_tax`; nothing here enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_taxable_amount: Option<f64>,

    /// Central GST component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgst: Option<f64>,

    /// State GST component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgst: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,

    /// Total predicted by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<f64>,
}

impl InvoiceRecord {
    /// Identifier used in export filenames.
    pub fn export_id(&self) -> String {
        match self.invoice_number.as_deref() {
            Some(number) if !number.is_empty() => number.replace(['/', '\\'], "_"),
            _ => "export".to_string(),
        }
    }

    /// List fields the service left empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.invoice_number.is_none() {
            missing.push("invoiceNumber");
        }
        if self.invoice_date.is_none() {
            missing.push("invoiceDate");
        }
        if self.vendor_name.is_none() {
            missing.push("vendorName");
        }
        if self.gstin.is_none() {
            missing.push("gstin");
        }
        if self.total_amount.is_none() {
            missing.push("totalAmount");
        }
        if self.line_items.is_empty() {
            missing.push("lineItems");
        }
        if self.tax_summary.grand_total.is_none() {
            missing.push("taxSummary.grandTotal");
        }

        missing
    }
}
