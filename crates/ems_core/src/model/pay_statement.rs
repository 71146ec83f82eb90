//! Pay statement record.
//!
//! A statement references its employee by value (`emp_id`); removal happens
//! through the store-level cascade when the employee row is deleted.

use crate::model::employee::EmployeeId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned pay statement identifier.
pub type StatementId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayStatement {
    pub statement_id: Option<StatementId>,
    pub emp_id: EmployeeId,
    pub amount: f64,
    pub pay_date: NaiveDate,
    /// Display label such as `January 2024`.
    pub pay_period: String,
}

impl PayStatement {
    /// Creates an unsaved statement for `emp_id`.
    pub fn new(
        emp_id: EmployeeId,
        amount: f64,
        pay_date: NaiveDate,
        pay_period: impl Into<String>,
    ) -> Self {
        Self {
            statement_id: None,
            emp_id,
            amount,
            pay_date,
            pay_period: pay_period.into(),
        }
    }
}
