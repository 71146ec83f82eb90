//! Employee record.
//!
//! # Invariants
//! - `emp_id` is `None` before the first save and immutable afterwards.
//! - `pay_statements` is a read projection loaded on demand; it is never
//!   written back as part of the employee row.

use crate::model::pay_statement::PayStatement;
use serde::{Deserialize, Serialize};

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

/// Employment type tag used by full-time reporting.
pub const FULL_TIME: &str = "FULL_TIME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_id: Option<EmployeeId>,
    pub first_name: String,
    pub last_name: String,
    /// Canonical nine-digit SSN once validated by the service layer.
    pub ssn: String,
    pub job_title: String,
    pub division: String,
    pub salary: f64,
    /// Free-form tag; only `FULL_TIME` has special meaning.
    pub employment_type: String,
    /// Most recent first when loaded by the report service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pay_statements: Vec<PayStatement>,
}

impl Employee {
    /// Creates an unsaved full-time employee.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        ssn: impl Into<String>,
        job_title: impl Into<String>,
        division: impl Into<String>,
        salary: f64,
    ) -> Self {
        Self {
            emp_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            ssn: ssn.into(),
            job_title: job_title.into(),
            division: division.into(),
            salary,
            employment_type: FULL_TIME.to_string(),
            pay_statements: Vec::new(),
        }
    }

    /// Replaces the employment type tag.
    pub fn with_employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = employment_type.into();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_full_time(&self) -> bool {
        self.employment_type == FULL_TIME
    }
}

#[cfg(test)]
mod tests {
    use super::{Employee, FULL_TIME};

    #[test]
    fn new_employee_defaults_to_full_time_without_history() {
        let employee = Employee::new("Ada", "Lovelace", "123456789", "Engineer", "R&D", 90_000.0);
        assert_eq!(employee.emp_id, None);
        assert_eq!(employee.employment_type, FULL_TIME);
        assert!(employee.is_full_time());
        assert!(employee.pay_statements.is_empty());
        assert_eq!(employee.full_name(), "Ada Lovelace");
    }

    #[test]
    fn employment_type_override() {
        let employee = Employee::new("A", "B", "123456789", "Intern", "Ops", 1.0)
            .with_employment_type("PART_TIME");
        assert!(!employee.is_full_time());
    }
}
