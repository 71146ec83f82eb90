//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `employee` table plus name/SSN/full-time lookups.
//! - Set-based bulk salary adjustment over a half-open salary range.
//!
//! # Invariants
//! - `update`, `delete` and `update_salary_by_range` each run one statement
//!   inside a scoped transaction; failures roll back before returning.
//! - `update`/`delete` matching zero rows fail with `RepoError::NotFound`.
//! - `update_salary_by_range` matching zero rows succeeds with count `0`.
//! - `find_by_ssn` expects the canonical nine-digit form.

use super::{like_substring_pattern, RepoError, RepoResult};
use crate::db::{with_transaction, ConnectionProvider, UNICODE_LOWER_FN};
use crate::model::employee::{Employee, EmployeeId, FULL_TIME};
use crate::model::salary_range::SalaryRange;
use log::{error, info};
use rusqlite::{params, OptionalExtension, Row};
use std::time::Instant;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    empId,
    firstName,
    lastName,
    ssn,
    jobTitle,
    division,
    salary,
    employmentType
FROM employee";

/// Repository interface for employee persistence.
pub trait EmployeeRepository {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Case-insensitive (full Unicode) substring match on first OR last name.
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Employee>>;
    fn find_by_ssn(&self, ssn: &str) -> RepoResult<Option<Employee>>;
    fn find_all(&self) -> RepoResult<Vec<Employee>>;
    /// Employees whose employment type is exactly `FULL_TIME`.
    fn find_all_full_time(&self) -> RepoResult<Vec<Employee>>;
    /// Inserts a new row and writes the generated id back into `employee`.
    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId>;
    fn update(&self, employee: &Employee) -> RepoResult<()>;
    fn delete(&self, id: EmployeeId) -> RepoResult<()>;
    /// Raises every salary in `[min, max)` and returns the affected count.
    fn update_salary_by_range(&self, range: &SalaryRange) -> RepoResult<usize>;

    /// Same as `find_by_id`; kept for employee-number lookups.
    fn find_by_emp_id(&self, emp_id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.find_by_id(emp_id)
    }
}

/// SQLite-backed employee repository.
#[derive(Clone, Copy)]
pub struct SqliteEmployeeRepository<'p> {
    provider: &'p dyn ConnectionProvider,
}

impl<'p> SqliteEmployeeRepository<'p> {
    pub fn new(provider: &'p dyn ConnectionProvider) -> Self {
        Self { provider }
    }

    fn query_list(&self, sql: &str, bind: &[&dyn rusqlite::ToSql]) -> RepoResult<Vec<Employee>> {
        let conn = self.provider.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(bind, parse_employee_row)?;
        let employees = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }

    fn query_one(
        &self,
        sql: &str,
        bind: &[&dyn rusqlite::ToSql],
    ) -> RepoResult<Option<Employee>> {
        let conn = self.provider.acquire()?;
        let employee = conn.query_row(sql, bind, parse_employee_row).optional()?;
        Ok(employee)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.query_one(&format!("{EMPLOYEE_SELECT_SQL} WHERE empId = ?1;"), &[&id])
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Employee>> {
        let pattern = like_substring_pattern(&name.to_lowercase());
        self.query_list(
            &format!(
                "{EMPLOYEE_SELECT_SQL}
                 WHERE {UNICODE_LOWER_FN}(firstName) LIKE ?1 ESCAPE '\\'
                    OR {UNICODE_LOWER_FN}(lastName) LIKE ?1 ESCAPE '\\'
                 ORDER BY empId ASC;"
            ),
            &[&pattern],
        )
    }

    fn find_by_ssn(&self, ssn: &str) -> RepoResult<Option<Employee>> {
        self.query_one(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE ssn = ?1 ORDER BY empId ASC LIMIT 1;"),
            &[&ssn],
        )
    }

    fn find_all(&self) -> RepoResult<Vec<Employee>> {
        self.query_list(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY empId ASC;"), &[])
    }

    fn find_all_full_time(&self) -> RepoResult<Vec<Employee>> {
        self.query_list(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE employmentType = ?1 ORDER BY empId ASC;"),
            &[&FULL_TIME],
        )
    }

    fn save(&self, employee: &mut Employee) -> RepoResult<EmployeeId> {
        let conn = self.provider.acquire()?;
        let inserted = conn.execute(
            "INSERT INTO employee (
                firstName,
                lastName,
                ssn,
                jobTitle,
                division,
                salary,
                employmentType
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                employee.first_name,
                employee.last_name,
                employee.ssn,
                employee.job_title,
                employee.division,
                employee.salary,
                employee.employment_type,
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::NoRowsAffected("employee insert"));
        }

        let emp_id = conn.last_insert_rowid();
        employee.emp_id = Some(emp_id);
        info!("event=employee_save module=repo status=ok emp_id={emp_id}");
        Ok(emp_id)
    }

    fn update(&self, employee: &Employee) -> RepoResult<()> {
        let emp_id = employee.emp_id.ok_or_else(|| {
            RepoError::InvalidData("cannot update an employee without an identifier".to_string())
        })?;
        let started_at = Instant::now();
        let mut conn = self.provider.acquire()?;

        let result = with_transaction(&mut conn, "employee_update", |tx| {
            let changed = tx.execute(
                "UPDATE employee
                 SET
                    firstName = ?1,
                    lastName = ?2,
                    ssn = ?3,
                    jobTitle = ?4,
                    division = ?5,
                    salary = ?6,
                    employmentType = ?7
                 WHERE empId = ?8;",
                params![
                    employee.first_name,
                    employee.last_name,
                    employee.ssn,
                    employee.job_title,
                    employee.division,
                    employee.salary,
                    employee.employment_type,
                    emp_id,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "employee",
                    id: emp_id,
                });
            }
            Ok(())
        });

        log_mutation("employee_update", emp_id, started_at, &result);
        result
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        let started_at = Instant::now();
        let mut conn = self.provider.acquire()?;

        let result = with_transaction(&mut conn, "employee_delete", |tx| {
            let changed = tx.execute("DELETE FROM employee WHERE empId = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: "employee",
                    id,
                });
            }
            Ok(())
        });

        log_mutation("employee_delete", id, started_at, &result);
        result
    }

    fn update_salary_by_range(&self, range: &SalaryRange) -> RepoResult<usize> {
        let started_at = Instant::now();
        let mut conn = self.provider.acquire()?;

        let result = with_transaction(&mut conn, "salary_range_update", |tx| {
            let affected = tx.execute(
                "UPDATE employee
                 SET salary = salary * (1 + ?1 / 100.0)
                 WHERE salary >= ?2
                   AND salary < ?3;",
                params![
                    range.percentage_increase,
                    range.min_salary,
                    range.max_salary
                ],
            )?;
            Ok::<_, RepoError>(affected)
        });

        match &result {
            Ok(affected) => info!(
                "event=salary_range_update module=repo status=ok affected={affected} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=salary_range_update module=repo status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        emp_id: Some(row.get("empId")?),
        first_name: row.get("firstName")?,
        last_name: row.get("lastName")?,
        ssn: row.get("ssn")?,
        job_title: row.get("jobTitle")?,
        division: row.get("division")?,
        salary: row.get("salary")?,
        employment_type: row.get("employmentType")?,
        pay_statements: Vec::new(),
    })
}

fn log_mutation(event: &str, emp_id: EmployeeId, started_at: Instant, result: &RepoResult<()>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(()) => info!(
            "event={event} module=repo status=ok emp_id={emp_id} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event={event} module=repo status=error emp_id={emp_id} duration_ms={duration_ms} error_kind={} error={err}",
            err.kind()
        ),
    }
}
