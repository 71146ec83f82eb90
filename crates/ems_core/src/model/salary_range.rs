//! Half-open salary range used by bulk salary adjustments.
//!
//! # Invariants
//! - Valid iff `min_salary < max_salary && percentage_increase > 0`.
//! - Membership is `[min_salary, max_salary)`, so adjacent ranges tile the
//!   salary axis without overlap.
//! - No currency rounding is applied to computed salaries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min_salary: f64,
    pub max_salary: f64,
    pub percentage_increase: f64,
}

impl SalaryRange {
    pub fn new(min_salary: f64, max_salary: f64, percentage_increase: f64) -> Self {
        Self {
            min_salary,
            max_salary,
            percentage_increase,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_salary < self.max_salary && self.percentage_increase > 0.0
    }

    /// Min inclusive, max exclusive.
    pub fn is_in_range(&self, salary: f64) -> bool {
        salary >= self.min_salary && salary < self.max_salary
    }

    /// Returns `current * (1 + percentage / 100)`.
    pub fn calculate_new_salary(&self, current_salary: f64) -> f64 {
        current_salary * (1.0 + self.percentage_increase / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::SalaryRange;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn bounds_are_half_open() {
        let range = SalaryRange::new(60_000.0, 100_000.0, 10.0);
        assert!(range.is_in_range(60_000.0));
        assert!(range.is_in_range(99_999.99));
        assert!(!range.is_in_range(100_000.0));
        assert!(!range.is_in_range(59_999.99));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let lower = SalaryRange::new(0.01, 50_000.0, 5.0);
        let upper = SalaryRange::new(50_000.0, 90_000.0, 3.0);
        for salary in [49_999.99, 50_000.0, 50_000.01] {
            assert!(lower.is_in_range(salary) ^ upper.is_in_range(salary));
        }
    }

    #[test]
    fn new_salary_applies_percentage() {
        let range = SalaryRange::new(58_000.0, 105_000.0, 3.2);
        assert_close(range.calculate_new_salary(75_000.0), 77_400.0);
        assert_close(range.calculate_new_salary(95_000.0), 98_040.0);
        assert_eq!(
            range.calculate_new_salary(75_000.0),
            75_000.0 * (1.0 + 3.2 / 100.0)
        );
    }

    #[test]
    fn validity_requires_ordering_and_positive_percentage() {
        assert!(SalaryRange::new(1.0, 2.0, 0.5).is_valid());
        assert!(!SalaryRange::new(2.0, 2.0, 0.5).is_valid());
        assert!(!SalaryRange::new(3.0, 2.0, 0.5).is_valid());
        assert!(!SalaryRange::new(1.0, 2.0, 0.0).is_valid());
        assert!(!SalaryRange::new(1.0, 2.0, -1.0).is_valid());
    }
}
