//! SQLite storage bootstrap, connection provisioning and transactions.
//!
//! # Responsibility
//! - Hand out configured connections per operation (`ConnectionProvider`).
//! - Apply schema migrations in deterministic order.
//! - Bracket single-statement mutations in scoped transactions.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every acquired connection has `foreign_keys=ON` so the
//!   `employee -> paystatement` cascade is enforced by the store.
//! - Connections are released by drop; no connection outlives one
//!   repository call.

use crate::config::ConfigError;
use crate::error::ErrorKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod provider;
mod tx;

pub use provider::{ConnectionProvider, SqliteConnectionProvider, StoreTarget, UNICODE_LOWER_FN};
pub use tx::with_transaction;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Connection settings cannot be turned into a store target.
    Config(ConfigError),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Sqlite(_) | Self::UnsupportedSchemaVersion { .. } => ErrorKind::DataAccess,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ConfigError> for DbError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
