//! Bulk salary adjustment use-case.
//!
//! # Invariants
//! - Percentage, range ordering and both bounds are validated before a
//!   `SalaryRange` is built; the built range is re-checked before the store
//!   is touched.
//! - The affected-row count is returned unchanged; `0` is a success.

use super::{ensure, RepoResultExt, ServiceResult};
use crate::model::salary_range::SalaryRange;
use crate::repo::employee_repo::EmployeeRepository;
use crate::validation::{is_valid_percentage, is_valid_salary, is_valid_salary_range};
use log::info;

pub struct SalaryService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> SalaryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Raises every salary in `[min_salary, max_salary)` by `percentage`
    /// percent and returns how many employees were updated.
    pub fn apply_salary_increase(
        &self,
        percentage: f64,
        min_salary: f64,
        max_salary: f64,
    ) -> ServiceResult<usize> {
        ensure(
            is_valid_percentage(percentage),
            "Percentage must be greater than 0",
        )?;
        ensure(
            is_valid_salary_range(min_salary, max_salary),
            "Minimum salary must be less than maximum salary",
        )?;
        ensure(
            is_valid_salary(min_salary),
            "Minimum salary must be greater than 0",
        )?;
        ensure(
            is_valid_salary(max_salary),
            "Maximum salary must be greater than 0",
        )?;

        let range = SalaryRange::new(min_salary, max_salary, percentage);
        ensure(range.is_valid(), "Invalid salary range parameters")?;

        let affected = self
            .repo
            .update_salary_by_range(&range)
            .during("applying salary increase")?;
        info!("event=salary_increase module=service status=ok affected={affected}");
        Ok(affected)
    }
}
