//! Invoice view-model derivation: adapting service replies and computing
//! display figures.

mod adapter;
mod figures;

pub use adapter::adapt;
pub use figures::{
    category_totals, is_validated, is_validated_with, line_figures, tax_consistency,
    CategoryTotal, LineFigures, UNCATEGORIZED,
};
