//! Module defining a single parsed line of sales input

use std::fmt;

use crate::domain::Money;

/// One validated `department,date,sales` triple.
///
/// Can only be built through [`SalesRecord::new`], which rejects an empty department. The amount is
/// a [`Money`] value and therefore always finite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    department: String,
    date: String,
    amount: Money,
}

impl SalesRecord {
    pub(crate) fn new(
        department: impl Into<String>,
        date: impl Into<String>,
        amount: Money,
    ) -> Result<Self, String> {
        let department = department.into();
        if department.is_empty() {
            return Err("department must not be empty".to_string());
        }
        Ok(Self {
            department,
            date: date.into(),
            amount,
        })
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    /// The date exactly as it appeared in the input. Never interpreted.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

impl fmt::Display for SalesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.department, self.date, self.amount)
    }
}
