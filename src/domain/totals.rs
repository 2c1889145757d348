//! Module defining the running per-department totals

use indexmap::IndexMap;

use crate::{
    domain::{Money, SalesRecord},
    error::ParseError,
};

/// Running sales total per department.
///
/// Keys are exact, case-sensitive department names and keep the order in which they were first
/// seen, which makes the summary deterministic for a given input.
#[derive(Debug, Default)]
pub struct DepartmentTotals {
    totals: IndexMap<String, Money>,
}

impl DepartmentTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the record's amount to the total of its department, creating the entry on first occurrence.
    ///
    /// Fails only if the new total would not be representable. The state is left unchanged in that case.
    pub fn accumulate(&mut self, record: &SalesRecord) -> Result<(), ParseError> {
        match self.totals.get_mut(record.department()) {
            Some(total) => {
                *total = total.checked_add(record.amount()).ok_or_else(|| {
                    ParseError::TotalOverflow(record.department().to_string())
                })?;
            }
            None => {
                self.totals
                    .insert(record.department().to_string(), record.amount());
            }
        }
        Ok(())
    }

    /// Returns the totals in first-seen order. Does not consume or modify the state.
    pub fn snapshot(&self) -> Vec<DepartmentTotal> {
        self.totals
            .iter()
            .map(|(department, total)| DepartmentTotal {
                department: department.clone(),
                total_sales: *total,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// One row of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentTotal {
    pub department: String,
    pub total_sales: Money,
}

impl DepartmentTotal {
    pub fn new(department: impl Into<String>, total_sales: Money) -> Self {
        Self {
            department: department.into(),
            total_sales,
        }
    }
}
