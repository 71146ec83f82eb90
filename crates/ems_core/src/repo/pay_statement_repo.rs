//! Pay statement repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `paystatement` table.
//! - Monthly aggregation joined to `employee` by job title and division.
//!
//! # Invariants
//! - Writes are single statements in autocommit mode.
//! - `find_by_employee_id` is ordered by pay date, most recent first.
//! - Aggregations only contain groups that have matching statements.

use super::{RepoError, RepoResult};
use crate::db::ConnectionProvider;
use crate::model::employee::EmployeeId;
use crate::model::pay_statement::{PayStatement, StatementId};
use log::info;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::BTreeMap;

const STATEMENT_SELECT_SQL: &str = "SELECT
    statementId,
    empId,
    amount,
    payDate,
    payPeriod
FROM paystatement";

/// Employee column a monthly pay total is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayGrouping {
    JobTitle,
    Division,
}

impl PayGrouping {
    fn column(self) -> &'static str {
        match self {
            Self::JobTitle => "jobTitle",
            Self::Division => "division",
        }
    }
}

/// Repository interface for pay statement persistence and reporting.
pub trait PayStatementRepository {
    fn find_by_id(&self, id: StatementId) -> RepoResult<Option<PayStatement>>;
    fn find_all(&self) -> RepoResult<Vec<PayStatement>>;
    /// Most recent pay date first.
    fn find_by_employee_id(&self, emp_id: EmployeeId) -> RepoResult<Vec<PayStatement>>;
    /// Statements whose pay date falls in the given calendar month.
    fn find_by_month_and_year(&self, month: u32, year: i32) -> RepoResult<Vec<PayStatement>>;
    fn total_pay_by(
        &self,
        grouping: PayGrouping,
        month: u32,
        year: i32,
    ) -> RepoResult<BTreeMap<String, f64>>;
    /// Inserts a new row and writes the generated id back into `statement`.
    fn save(&self, statement: &mut PayStatement) -> RepoResult<StatementId>;
    fn update(&self, statement: &PayStatement) -> RepoResult<()>;
    fn delete(&self, id: StatementId) -> RepoResult<()>;

    fn get_total_pay_by_job_title(
        &self,
        month: u32,
        year: i32,
    ) -> RepoResult<BTreeMap<String, f64>> {
        self.total_pay_by(PayGrouping::JobTitle, month, year)
    }

    fn get_total_pay_by_division(
        &self,
        month: u32,
        year: i32,
    ) -> RepoResult<BTreeMap<String, f64>> {
        self.total_pay_by(PayGrouping::Division, month, year)
    }
}

/// SQLite-backed pay statement repository.
#[derive(Clone, Copy)]
pub struct SqlitePayStatementRepository<'p> {
    provider: &'p dyn ConnectionProvider,
}

impl<'p> SqlitePayStatementRepository<'p> {
    pub fn new(provider: &'p dyn ConnectionProvider) -> Self {
        Self { provider }
    }

    fn query_list(
        &self,
        sql: &str,
        bind: &[&dyn rusqlite::ToSql],
    ) -> RepoResult<Vec<PayStatement>> {
        let conn = self.provider.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(bind, parse_statement_row)?;
        let statements = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(statements)
    }
}

impl PayStatementRepository for SqlitePayStatementRepository<'_> {
    fn find_by_id(&self, id: StatementId) -> RepoResult<Option<PayStatement>> {
        let conn = self.provider.acquire()?;
        let statement = conn
            .query_row(
                &format!("{STATEMENT_SELECT_SQL} WHERE statementId = ?1;"),
                [id],
                parse_statement_row,
            )
            .optional()?;
        Ok(statement)
    }

    fn find_all(&self) -> RepoResult<Vec<PayStatement>> {
        self.query_list(
            &format!("{STATEMENT_SELECT_SQL} ORDER BY statementId ASC;"),
            &[],
        )
    }

    fn find_by_employee_id(&self, emp_id: EmployeeId) -> RepoResult<Vec<PayStatement>> {
        self.query_list(
            &format!(
                "{STATEMENT_SELECT_SQL}
                 WHERE empId = ?1
                 ORDER BY payDate DESC, statementId DESC;"
            ),
            &[&emp_id],
        )
    }

    fn find_by_month_and_year(&self, month: u32, year: i32) -> RepoResult<Vec<PayStatement>> {
        self.query_list(
            &format!(
                "{STATEMENT_SELECT_SQL}
                 WHERE CAST(strftime('%m', payDate) AS INTEGER) = ?1
                   AND CAST(strftime('%Y', payDate) AS INTEGER) = ?2
                 ORDER BY payDate ASC, statementId ASC;"
            ),
            &[&month, &year],
        )
    }

    fn total_pay_by(
        &self,
        grouping: PayGrouping,
        month: u32,
        year: i32,
    ) -> RepoResult<BTreeMap<String, f64>> {
        let column = grouping.column();
        let conn = self.provider.acquire()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT e.{column} AS label, SUM(p.amount) AS total
             FROM paystatement p
             INNER JOIN employee e ON e.empId = p.empId
             WHERE CAST(strftime('%m', p.payDate) AS INTEGER) = ?1
               AND CAST(strftime('%Y', p.payDate) AS INTEGER) = ?2
             GROUP BY e.{column}
             ORDER BY e.{column} ASC;"
        ))?;
        let rows = stmt.query_map(params![month, year], |row| {
            Ok((row.get::<_, String>("label")?, row.get::<_, f64>("total")?))
        })?;
        let totals = rows.collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(totals)
    }

    fn save(&self, statement: &mut PayStatement) -> RepoResult<StatementId> {
        let conn = self.provider.acquire()?;
        let inserted = conn.execute(
            "INSERT INTO paystatement (empId, amount, payDate, payPeriod)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                statement.emp_id,
                statement.amount,
                statement.pay_date,
                statement.pay_period,
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::NoRowsAffected("pay statement insert"));
        }

        let statement_id = conn.last_insert_rowid();
        statement.statement_id = Some(statement_id);
        info!(
            "event=pay_statement_save module=repo status=ok statement_id={statement_id} emp_id={}",
            statement.emp_id
        );
        Ok(statement_id)
    }

    fn update(&self, statement: &PayStatement) -> RepoResult<()> {
        let statement_id = statement.statement_id.ok_or_else(|| {
            RepoError::InvalidData(
                "cannot update a pay statement without an identifier".to_string(),
            )
        })?;
        let conn = self.provider.acquire()?;
        let changed = conn.execute(
            "UPDATE paystatement
             SET
                empId = ?1,
                amount = ?2,
                payDate = ?3,
                payPeriod = ?4
             WHERE statementId = ?5;",
            params![
                statement.emp_id,
                statement.amount,
                statement.pay_date,
                statement.pay_period,
                statement_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "pay statement",
                id: statement_id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: StatementId) -> RepoResult<()> {
        let conn = self.provider.acquire()?;
        let changed = conn.execute("DELETE FROM paystatement WHERE statementId = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "pay statement",
                id,
            });
        }
        Ok(())
    }
}

fn parse_statement_row(row: &Row<'_>) -> rusqlite::Result<PayStatement> {
    Ok(PayStatement {
        statement_id: Some(row.get("statementId")?),
        emp_id: row.get("empId")?,
        amount: row.get("amount")?,
        pay_date: row.get("payDate")?,
        pay_period: row.get("payPeriod")?,
    })
}
