//! Values derived from a record at display time. Nothing here mutates the record.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::invoice::{InvoiceRecord, LineItem, TaxSummary};

/// Group key for line items the service left uncategorized.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Per-line tax and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFigures {
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

/// Line items of one category, summed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Literal category label.
    pub key: String,
    pub total: Decimal,
    pub count: usize,
}

fn decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

/// Tax amount (`amount * rate / 100`) and line total for one line item.
///
/// `None` when the amount or rate is missing, not representable, or the
/// result overflows.
pub fn line_figures(item: &LineItem) -> Option<LineFigures> {
    let amount = decimal(item.amount)?;
    let rate = decimal(item.tax_rate)?;

    let tax_amount = amount.checked_mul(rate)?.checked_div(Decimal::ONE_HUNDRED)?;
    Some(LineFigures {
        tax_amount,
        line_total: amount.checked_add(tax_amount)?,
    })
}

/// Whether the extracted total is within 10% of the predicted grand total.
pub fn is_validated(record: &InvoiceRecord) -> bool {
    is_validated_with(record, Decimal::new(1, 1))
}

/// [`is_validated`] with an explicit relative tolerance.
///
/// A heuristic signal for display, not a correctness check. Missing totals
/// or totals too large to compare never validate.
pub fn is_validated_with(record: &InvoiceRecord, tolerance: Decimal) -> bool {
    let (Some(total), Some(grand)) = (
        decimal(record.total_amount),
        decimal(record.tax_summary.grand_total),
    ) else {
        return false;
    };

    match (total.checked_sub(grand), total.checked_mul(tolerance)) {
        (Some(gap), Some(band)) => gap.abs() < band,
        _ => false,
    }
}

/// Sum line items per category in first-seen order. Sums saturate at the
/// `Decimal` bounds.
pub fn category_totals(record: &InvoiceRecord) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();

    for item in &record.line_items {
        let key = item
            .category
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or(UNCATEGORIZED);
        let amount = decimal(item.amount).unwrap_or_default();

        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => {
                group.total = group.total.saturating_add(amount);
                group.count += 1;
            }
            None => groups.push(CategoryTotal {
                key: key.to_string(),
                total: amount,
                count: 1,
            }),
        }
    }

    groups
}

/// Report (never correct) tax totals that do not add up.
pub fn tax_consistency(summary: &TaxSummary) -> Vec<String> {
    let mut issues = Vec::new();

    if let (Some(cgst), Some(sgst), Some(total_tax)) = (
        decimal(summary.cgst),
        decimal(summary.sgst),
        decimal(summary.total_tax),
    ) {
        check_sum(&mut issues, "CGST + SGST", cgst, sgst, "total tax", total_tax);
    }

    if let (Some(taxable), Some(total_tax), Some(grand)) = (
        decimal(summary.total_taxable_amount),
        decimal(summary.total_tax),
        decimal(summary.grand_total),
    ) {
        check_sum(
            &mut issues,
            "Taxable amount + tax",
            taxable,
            total_tax,
            "grand total",
            grand,
        );
    }

    issues
}

fn check_sum(
    issues: &mut Vec<String>,
    label: &str,
    left: Decimal,
    right: Decimal,
    expected_label: &str,
    expected: Decimal,
) {
    let tolerance = Decimal::new(1, 2);

    let Some(sum) = left.checked_add(right) else {
        issues.push(format!("{label} is too large to check against {expected_label}"));
        return;
    };

    match sum.checked_sub(expected) {
        Some(gap) if gap.abs() <= tolerance => {}
        Some(_) => issues.push(format!(
            "{label} ({sum}) differs from {expected_label} ({expected})"
        )),
        None => issues.push(format!("{label} is too large to check against {expected_label}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::Category;
    use pretty_assertions::assert_eq;

    fn item(amount: f64, rate: f64, category: Option<Category>) -> LineItem {
        LineItem {
            description: Some("item".to_string()),
            amount: Some(amount),
            category,
            tax_rate: Some(rate),
        }
    }

    fn record_with_totals(total: Option<f64>, grand: Option<f64>) -> InvoiceRecord {
        InvoiceRecord {
            total_amount: total,
            tax_summary: TaxSummary {
                grand_total: grand,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_line_figures() {
        let figures = line_figures(&item(200.0, 18.0, None)).unwrap();
        assert_eq!(figures.tax_amount, Decimal::from(36));
        assert_eq!(figures.line_total, Decimal::from(236));
    }

    #[test]
    fn test_line_figures_fractional() {
        let figures = line_figures(&item(99.5, 5.0, None)).unwrap();
        assert_eq!(figures.tax_amount, Decimal::new(4975, 3));
        assert_eq!(figures.line_total, Decimal::new(104475, 3));
    }

    #[test]
    fn test_line_figures_missing_inputs() {
        let mut line = item(200.0, 18.0, None);
        line.tax_rate = None;
        assert_eq!(line_figures(&line), None);

        line.tax_rate = Some(18.0);
        line.amount = None;
        assert_eq!(line_figures(&line), None);
    }

    #[test]
    fn test_validation_flag() {
        assert!(is_validated(&record_with_totals(Some(1000.0), Some(1050.0))));
        assert!(!is_validated(&record_with_totals(Some(1000.0), Some(1200.0))));
        // exactly 10% is outside the band
        assert!(!is_validated(&record_with_totals(Some(1000.0), Some(1100.0))));
    }

    #[test]
    fn test_validation_flag_missing_totals() {
        assert!(!is_validated(&record_with_totals(None, Some(1000.0))));
        assert!(!is_validated(&record_with_totals(Some(1000.0), None)));
    }

    #[test]
    fn test_validation_does_not_touch_record() {
        let record = record_with_totals(Some(1000.0), Some(1050.0));
        let before = record.clone();
        is_validated(&record);
        assert_eq!(record, before);
    }

    #[test]
    fn test_category_totals_first_seen_order() {
        let record = InvoiceRecord {
            line_items: vec![
                item(100.0, 18.0, Some(Category::Services)),
                item(50.0, 5.0, Some(Category::Goods)),
                item(25.0, 18.0, Some(Category::Services)),
                item(10.0, 0.0, Some(Category::Other("luxury".to_string()))),
                item(5.0, 0.0, None),
            ],
            ..Default::default()
        };

        let totals = category_totals(&record);
        let keys: Vec<&str> = totals.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["services", "goods", "luxury", UNCATEGORIZED]);
        assert_eq!(totals[0].total, Decimal::from(125));
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[2].count, 1);
    }

    #[test]
    fn test_tax_consistency() {
        let consistent = TaxSummary {
            total_taxable_amount: Some(1000.0),
            cgst: Some(90.0),
            sgst: Some(90.0),
            total_tax: Some(180.0),
            grand_total: Some(1180.0),
        };
        assert!(tax_consistency(&consistent).is_empty());

        let off = TaxSummary {
            total_tax: Some(200.0),
            ..consistent
        };
        assert_eq!(tax_consistency(&off).len(), 2);

        assert!(tax_consistency(&TaxSummary::default()).is_empty());
    }

    #[test]
    fn test_huge_amounts_do_not_panic() {
        assert_eq!(line_figures(&item(7.9e28, 1.0, None)), None);
        assert_eq!(line_figures(&item(7.0e28, 100.0, None)), None);

        assert!(!is_validated(&record_with_totals(Some(7.0e28), Some(-7.0e28))));

        let record = InvoiceRecord {
            line_items: vec![
                item(7.0e28, 0.0, Some(Category::Goods)),
                item(7.0e28, 0.0, Some(Category::Goods)),
            ],
            ..Default::default()
        };
        let totals = category_totals(&record);
        assert_eq!(totals[0].total, Decimal::MAX);
        assert_eq!(totals[0].count, 2);

        let summary = TaxSummary {
            total_taxable_amount: Some(7.0e28),
            cgst: Some(7.0e28),
            sgst: Some(7.0e28),
            total_tax: Some(7.0e28),
            grand_total: Some(-7.0e28),
        };
        let issues = tax_consistency(&summary);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.contains("too large")));
    }
}
