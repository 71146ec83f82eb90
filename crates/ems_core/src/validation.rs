//! Input validation rules gating every employee/payroll mutation.
//!
//! # Responsibility
//! - Provide pure predicates over primitive inputs.
//! - Canonicalize SSN text before storage or comparison.
//!
//! # Invariants
//! - Every predicate is total: it never panics and never performs I/O.
//! - Services compose these predicates instead of re-implementing them.
//!
//! Absent values are modelled with `Option` at the call site; an absent SSN
//! is invalid and stripping an absent SSN stays absent
//! (`None.map(strip_ssn_formatting)`).

use once_cell::sync::Lazy;
use regex::Regex;

static CANONICAL_SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("valid ssn regex"));

pub const MIN_REPORT_YEAR: i32 = 2000;
pub const MAX_REPORT_YEAR: i32 = 2100;

/// Returns whether `ssn` is exactly nine ASCII digits with no separators.
pub fn is_valid_ssn(ssn: &str) -> bool {
    CANONICAL_SSN_RE.is_match(ssn)
}

/// Removes every non-digit character, e.g. `123-45-6789` -> `123456789`.
pub fn strip_ssn_formatting(ssn: &str) -> String {
    ssn.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_salary(salary: f64) -> bool {
    salary > 0.0
}

pub fn is_valid_percentage(percentage: f64) -> bool {
    percentage > 0.0
}

/// Returns whether `min < max`. Equal bounds describe an empty range.
pub fn is_valid_salary_range(min_salary: f64, max_salary: f64) -> bool {
    min_salary < max_salary
}

pub fn is_valid_employee_id(emp_id: i64) -> bool {
    emp_id > 0
}

pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

pub fn is_valid_year(year: i32) -> bool {
    (MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year)
}

/// Returns whether `value` has non-whitespace content.
pub fn is_not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}
