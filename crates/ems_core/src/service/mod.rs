//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input before any store access (fail fast).
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.
//!
//! # Invariants
//! - A validation failure is returned before any repository call.
//! - Store failures propagate unchanged in kind; services never swallow them.

use crate::error::ErrorKind;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_service;
pub mod report_service;
pub mod salary_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure surfaced by service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any store access.
    Validation(String),
    /// Targeted update/delete matched no row.
    NotFound { entity: &'static str, id: i64 },
    /// Store access was attempted and failed.
    DataAccess {
        context: &'static str,
        source: RepoError,
    },
    /// Store could not be reached because settings are unusable.
    Configuration {
        context: &'static str,
        source: RepoError,
    },
}

impl ServiceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DataAccess { .. } => ErrorKind::DataAccess,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    fn from_repo(context: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other if other.kind() == ErrorKind::Configuration => Self::Configuration {
                context,
                source: other,
            },
            other => Self::DataAccess {
                context,
                source: other,
            },
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DataAccess { context, source } => write!(f, "error {context}: {source}"),
            Self::Configuration { context, source } => {
                write!(f, "cannot connect while {context}: {source}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataAccess { source, .. } | Self::Configuration { source, .. } => Some(source),
            Self::Validation(_) | Self::NotFound { .. } => None,
        }
    }
}

/// Attaches a use-case label to repository failures.
pub(crate) trait RepoResultExt<T> {
    fn during(self, context: &'static str) -> ServiceResult<T>;
}

impl<T> RepoResultExt<T> for RepoResult<T> {
    fn during(self, context: &'static str) -> ServiceResult<T> {
        self.map_err(|err| ServiceError::from_repo(context, err))
    }
}

/// Fails with `message` unless `valid`.
pub(crate) fn ensure(valid: bool, message: &str) -> ServiceResult<()> {
    if valid {
        Ok(())
    } else {
        Err(ServiceError::validation(message))
    }
}
