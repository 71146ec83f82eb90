//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define data access contracts for employees and pay statements.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repositories never cache rows across calls; each call acquires and
//!   releases its own connection.
//! - Store errors are never swallowed. A targeted update/delete matching
//!   zero rows is `NotFound`; an empty lookup is `None`/empty `Vec`.

use crate::db::DbError;
use crate::error::ErrorKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_repo;
pub mod pay_statement_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A targeted single-row mutation matched no row.
    NotFound { entity: &'static str, id: i64 },
    /// An insert reported zero affected rows.
    NoRowsAffected(&'static str),
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(err) => err.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NoRowsAffected(_) | Self::InvalidData(_) => ErrorKind::DataAccess,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NoRowsAffected(operation) => write!(f, "{operation} failed, no rows affected"),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::NoRowsAffected(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Escapes `%`, `_` and `\` so user text matches literally under
/// `LIKE .. ESCAPE '\'`.
pub(crate) fn like_substring_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
