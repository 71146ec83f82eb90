//! Failure taxonomy shared by every core layer.
//!
//! # Responsibility
//! - Name the failure kinds callers are expected to branch on.
//!
//! # Invariants
//! - Every core error type (`ConfigError`, `DbError`, `RepoError`,
//!   `ServiceError`) maps onto exactly one `ErrorKind`.
//! - "Lookup returned nothing" is never an error; only targeted single-row
//!   mutations that match zero rows surface as `NotFound`.

use std::fmt::{Display, Formatter};

/// Coarse failure category surfaced to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input rejected before any store access.
    Validation,
    /// A targeted update/delete matched zero rows.
    NotFound,
    /// The store operation could not complete.
    DataAccess,
    /// Connection settings are missing or invalid.
    Configuration,
}

impl ErrorKind {
    /// Stable lowercase label used in log events and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DataAccess => "data_access",
            Self::Configuration => "configuration",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
