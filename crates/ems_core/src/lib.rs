//! Core data-access and validation layer for the employee management system.
//! This crate is the single source of truth for payroll invariants.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{ConfigError, ConfigSource, DatabaseSettings};
pub use db::{ConnectionProvider, DbError, SqliteConnectionProvider};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::employee::{Employee, EmployeeId, FULL_TIME};
pub use model::pay_statement::{PayStatement, StatementId};
pub use model::salary_range::SalaryRange;
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::pay_statement_repo::{
    PayGrouping, PayStatementRepository, SqlitePayStatementRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::employee_service::{validate_employee, EmployeeService, SearchType};
pub use service::report_service::ReportService;
pub use service::salary_service::SalaryService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for entry points.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
