//! Employee mutation and search use-cases.
//!
//! # Responsibility
//! - Validate employee fields and canonicalize SSNs before persistence.
//! - Dispatch employee searches by name, SSN or employee id.
//!
//! # Invariants
//! - The canonical SSN is written back onto the employee before any store
//!   call, so callers observe the persisted form.
//! - Single-result lookups are wrapped into 0- or 1-element lists.

use super::{ensure, RepoResultExt, ServiceError, ServiceResult};
use crate::model::employee::{Employee, EmployeeId};
use crate::repo::employee_repo::EmployeeRepository;
use crate::validation::{
    is_not_empty, is_valid_employee_id, is_valid_salary, is_valid_ssn, strip_ssn_formatting,
};
use log::{debug, info};
use std::str::FromStr;

/// Field an employee search matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Case-insensitive substring of first or last name.
    Name,
    /// Exact canonical SSN; separators in the term are stripped first.
    Ssn,
    /// Exact positive employee id.
    EmpId,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Ssn => "ssn",
            Self::EmpId => "empid",
        }
    }
}

impl FromStr for SearchType {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "ssn" => Ok(Self::Ssn),
            "empid" => Ok(Self::EmpId),
            "" => Err(ServiceError::validation("Search type cannot be empty")),
            _ => Err(ServiceError::validation(
                "Invalid search type. Use 'name', 'ssn', or 'empid'",
            )),
        }
    }
}

/// Use-case service for employee records.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Searches employees by `search_type` (`name`, `ssn` or `empid`).
    ///
    /// # Errors
    /// - `Validation` for an empty term, an unknown type, an SSN that is not
    ///   nine digits after stripping, or an id that is not a positive
    ///   integer. No query runs in these cases.
    pub fn search_employee(&self, term: &str, search_type: &str) -> ServiceResult<Vec<Employee>> {
        ensure(is_not_empty(term), "Search term cannot be empty")?;
        let search_type = search_type.parse::<SearchType>()?;

        let found = match search_type {
            SearchType::Name => self.repo.find_by_name(term).during("searching for employee")?,
            SearchType::Ssn => {
                let ssn = strip_ssn_formatting(term);
                ensure(
                    is_valid_ssn(&ssn),
                    "Invalid SSN format. SSN must be 9 digits.",
                )?;
                self.repo
                    .find_by_ssn(&ssn)
                    .during("searching for employee")?
                    .into_iter()
                    .collect()
            }
            SearchType::EmpId => {
                let emp_id = parse_employee_id(term)?;
                self.repo
                    .find_by_emp_id(emp_id)
                    .during("searching for employee")?
                    .into_iter()
                    .collect()
            }
        };

        debug!(
            "event=employee_search module=service status=ok search_type={} hits={}",
            search_type.as_str(),
            found.len()
        );
        Ok(found)
    }

    /// Validates and inserts a new employee, returning its generated id.
    pub fn add_employee(&self, employee: &mut Employee) -> ServiceResult<EmployeeId> {
        validate_employee(employee)?;
        let emp_id = self.repo.save(employee).during("adding employee")?;
        info!("event=employee_add module=service status=ok emp_id={emp_id}");
        Ok(emp_id)
    }

    /// Validates the id and all fields, then updates the stored row.
    ///
    /// # Errors
    /// - `NotFound` when no employee has the given id.
    pub fn update_employee(&self, employee: &mut Employee) -> ServiceResult<()> {
        ensure(
            employee.emp_id.is_some_and(is_valid_employee_id),
            "Invalid employee ID",
        )?;
        validate_employee(employee)?;
        self.repo.update(employee).during("updating employee")
    }

    /// Deletes one employee; pay statements follow via store cascade.
    pub fn delete_employee(&self, emp_id: EmployeeId) -> ServiceResult<()> {
        ensure(is_valid_employee_id(emp_id), "Invalid employee ID")?;
        self.repo.delete(emp_id).during("deleting employee")
    }

    pub fn get_employee_by_id(&self, emp_id: EmployeeId) -> ServiceResult<Option<Employee>> {
        ensure(is_valid_employee_id(emp_id), "Invalid employee ID")?;
        self.repo.find_by_id(emp_id).during("retrieving employee")
    }

    pub fn get_all_employees(&self) -> ServiceResult<Vec<Employee>> {
        self.repo.find_all().during("retrieving all employees")
    }
}

/// Checks every required employee field and canonicalizes the SSN in place.
///
/// Fields are checked in declaration order; the first failure is returned.
pub fn validate_employee(employee: &mut Employee) -> ServiceResult<()> {
    ensure(is_not_empty(&employee.first_name), "First name is required")?;
    ensure(is_not_empty(&employee.last_name), "Last name is required")?;
    ensure(is_not_empty(&employee.ssn), "SSN is required")?;

    let canonical_ssn = strip_ssn_formatting(&employee.ssn);
    ensure(
        is_valid_ssn(&canonical_ssn),
        "Invalid SSN format. SSN must be exactly 9 digits.",
    )?;
    employee.ssn = canonical_ssn;

    ensure(is_not_empty(&employee.job_title), "Job title is required")?;
    ensure(is_not_empty(&employee.division), "Division is required")?;
    ensure(
        is_valid_salary(employee.salary),
        "Salary must be greater than 0",
    )?;
    ensure(
        is_not_empty(&employee.employment_type),
        "Employment type is required",
    )
}

fn parse_employee_id(term: &str) -> ServiceResult<EmployeeId> {
    let emp_id = term
        .trim()
        .parse::<EmployeeId>()
        .map_err(|_| ServiceError::validation("Employee ID must be a valid number"))?;
    ensure(
        is_valid_employee_id(emp_id),
        "Employee ID must be a positive number",
    )?;
    Ok(emp_id)
}
