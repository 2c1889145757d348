//! Module for the types defining the sales domain.

mod record;
mod totals;

use rust_decimal::Decimal;

pub use record::SalesRecord;
pub use totals::{DepartmentTotal, DepartmentTotals};

/// Sales amounts and running totals, in exact decimal arithmetic.
pub type Money = Decimal;
