//! Employee/payroll domain model.
//!
//! # Responsibility
//! - Define the data shapes persisted by the repositories.
//! - Hold the salary-range math applied by bulk adjustments.
//!
//! # Invariants
//! - Identifiers are assigned by the store and are `None` until saved.
//! - Persisted SSNs are always in canonical nine-digit form.

pub mod employee;
pub mod pay_statement;
pub mod salary_range;
