//! Payroll reporting use-cases.
//!
//! # Responsibility
//! - Build the full-time employee report with pay history attached.
//! - Validate month/year before monthly aggregation queries.
//!
//! # Invariants
//! - Pay history is fetched per employee, one query each, in employee order.
//! - Monthly totals omit groups without statements (no zero entries).

use super::{ensure, RepoResultExt, ServiceResult};
use crate::model::employee::Employee;
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::pay_statement_repo::{PayGrouping, PayStatementRepository};
use crate::validation::{is_valid_month, is_valid_year};
use log::info;
use std::collections::BTreeMap;

pub struct ReportService<E: EmployeeRepository, P: PayStatementRepository> {
    employees: E,
    pay_statements: P,
}

impl<E: EmployeeRepository, P: PayStatementRepository> ReportService<E, P> {
    pub fn new(employees: E, pay_statements: P) -> Self {
        Self {
            employees,
            pay_statements,
        }
    }

    /// Full-time employees, each with pay statements most recent first.
    pub fn generate_employee_report(&self) -> ServiceResult<Vec<Employee>> {
        let mut employees = self
            .employees
            .find_all_full_time()
            .during("generating employee report")?;

        for employee in &mut employees {
            if let Some(emp_id) = employee.emp_id {
                employee.pay_statements = self
                    .pay_statements
                    .find_by_employee_id(emp_id)
                    .during("generating employee report")?;
            }
        }

        info!(
            "event=employee_report module=service status=ok employees={}",
            employees.len()
        );
        Ok(employees)
    }

    /// Total pay per job title for one calendar month.
    pub fn generate_pay_by_job_title_report(
        &self,
        month: u32,
        year: i32,
    ) -> ServiceResult<BTreeMap<String, f64>> {
        self.monthly_totals(PayGrouping::JobTitle, month, year)
    }

    /// Total pay per division for one calendar month.
    pub fn generate_pay_by_division_report(
        &self,
        month: u32,
        year: i32,
    ) -> ServiceResult<BTreeMap<String, f64>> {
        self.monthly_totals(PayGrouping::Division, month, year)
    }

    fn monthly_totals(
        &self,
        grouping: PayGrouping,
        month: u32,
        year: i32,
    ) -> ServiceResult<BTreeMap<String, f64>> {
        ensure(
            is_valid_month(month),
            "Invalid month. Month must be between 1 and 12.",
        )?;
        ensure(
            is_valid_year(year),
            "Invalid year. Year must be between 2000 and 2100.",
        )?;

        let totals = self
            .pay_statements
            .total_pay_by(grouping, month, year)
            .during("generating pay report")?;

        info!(
            "event=pay_report module=service status=ok grouping={grouping:?} groups={}",
            totals.len()
        );
        Ok(totals)
    }
}
