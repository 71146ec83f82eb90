//! Connection provisioning for SQLite stores.
//!
//! # Responsibility
//! - Translate configured store URLs into SQLite open targets.
//! - Apply migrations once when the provider is constructed.
//! - Open one configured connection per `acquire` call.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, the configured busy
//!   timeout and the `unicode_lower` SQL function registered.
//! - In-memory stores are private to one provider and live exactly as long
//!   as it does.
//! - A failed acquisition is surfaced immediately; there is no retry.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::{ConfigError, DatabaseSettings};
use log::{debug, error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static MEMORY_STORE_SEQ: AtomicU64 = AtomicU64::new(0);

/// SQL scalar applying full Unicode lowercase; built-in `lower` only folds
/// ASCII.
pub const UNICODE_LOWER_FN: &str = "unicode_lower";

/// Source of per-operation store connections.
///
/// Release is scoped: dropping the returned connection releases it on
/// every exit path.
pub trait ConnectionProvider {
    fn acquire(&self) -> DbResult<Connection>;
}

/// Where a SQLite store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    File(PathBuf),
    Memory,
}

impl StoreTarget {
    /// Parses `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a
    /// bare file path.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if url == "sqlite::memory:" || url == ":memory:" {
            return Ok(Self::Memory);
        }
        if let Some(path) = url.strip_prefix("sqlite://") {
            return non_empty_path(path, url);
        }
        if let Some(path) = url.strip_prefix("sqlite:") {
            return non_empty_path(path, url);
        }
        if url.contains("://") || url.starts_with("jdbc:") {
            return Err(ConfigError::UnsupportedUrl(url.to_string()));
        }
        Ok(Self::File(PathBuf::from(url)))
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

fn non_empty_path(path: &str, url: &str) -> Result<StoreTarget, ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::UnsupportedUrl(url.to_string()));
    }
    Ok(StoreTarget::File(PathBuf::from(path)))
}

/// SQLite provider constructed once by the entry point and injected into
/// repositories.
pub struct SqliteConnectionProvider {
    settings: DatabaseSettings,
    target: StoreTarget,
    location: PathBuf,
    // Keeps a shared-cache in-memory store alive between acquisitions.
    _keeper: Option<Connection>,
}

impl SqliteConnectionProvider {
    /// Resolves the store target, opens it once and applies migrations.
    ///
    /// # Errors
    /// - `DbError::Config` for missing/unsupported URLs.
    /// - `DbError::Sqlite` when the store cannot be opened or migrated.
    /// - `DbError::UnsupportedSchemaVersion` for stores from newer builds.
    pub fn new(settings: DatabaseSettings) -> DbResult<Self> {
        let started_at = Instant::now();
        let target = StoreTarget::parse(&settings.url)?;
        info!("event=db_open module=db status=start mode={}", target.mode());

        let location = match &target {
            StoreTarget::File(path) => path.clone(),
            StoreTarget::Memory => PathBuf::from(next_memory_uri()),
        };

        let bootstrap = open_configured(&location, settings.connection_timeout)
            .and_then(|mut conn| apply_migrations(&mut conn).map(|()| conn));
        let conn = match bootstrap {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={} duration_ms={} error={}",
                    target.mode(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            target.mode(),
            started_at.elapsed().as_millis()
        );

        let keeper = match target {
            StoreTarget::Memory => Some(conn),
            StoreTarget::File(_) => None,
        };

        Ok(Self {
            settings,
            target,
            location,
            _keeper: keeper,
        })
    }

    /// Provider over a fresh private in-memory store.
    pub fn in_memory() -> DbResult<Self> {
        Self::new(DatabaseSettings::in_memory())
    }

    pub fn target(&self) -> &StoreTarget {
        &self.target
    }

    /// Returns whether a connection can be acquired and queried.
    pub fn test_connection(&self) -> bool {
        let probe = self.acquire().and_then(|conn| {
            conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
                .map_err(Into::into)
        });
        match probe {
            Ok(_) => true,
            Err(err) => {
                error!("event=db_probe module=db status=error error={err}");
                false
            }
        }
    }

    /// Human-readable connection summary. Never includes the password.
    pub fn connection_info(&self) -> String {
        format!(
            "Database URL: {}\nUsername: {}\nDriver: {}",
            self.settings.url,
            self.settings.username.as_deref().unwrap_or("<none>"),
            self.settings.driver
        )
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn acquire(&self) -> DbResult<Connection> {
        match open_configured(&self.location, self.settings.connection_timeout) {
            Ok(conn) => {
                debug!(
                    "event=db_acquire module=db status=ok mode={}",
                    self.target.mode()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_acquire module=db status=error mode={} error={}",
                    self.target.mode(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn open_configured(location: &Path, busy_timeout: Duration) -> DbResult<Connection> {
    let conn = Connection::open(location)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    register_unicode_lower(&conn)?;
    Ok(conn)
}

fn register_unicode_lower(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

fn next_memory_uri() -> String {
    let seq = MEMORY_STORE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "file:ems-memdb-{}-{seq}?mode=memory&cache=shared",
        std::process::id()
    )
}

#[cfg(test)]
mod tests {
    use super::StoreTarget;
    use crate::config::ConfigError;
    use std::path::PathBuf;

    #[test]
    fn parse_accepts_sqlite_forms() {
        assert_eq!(StoreTarget::parse("sqlite::memory:").unwrap(), StoreTarget::Memory);
        assert_eq!(
            StoreTarget::parse("sqlite:///var/lib/ems.db").unwrap(),
            StoreTarget::File(PathBuf::from("/var/lib/ems.db"))
        );
        assert_eq!(
            StoreTarget::parse("sqlite:data/ems.db").unwrap(),
            StoreTarget::File(PathBuf::from("data/ems.db"))
        );
        assert_eq!(
            StoreTarget::parse("ems.db").unwrap(),
            StoreTarget::File(PathBuf::from("ems.db"))
        );
    }

    #[test]
    fn parse_rejects_foreign_and_empty_urls() {
        assert!(matches!(
            StoreTarget::parse("jdbc:mysql://localhost:3306/employeeData"),
            Err(ConfigError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            StoreTarget::parse("postgres://localhost/ems"),
            Err(ConfigError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            StoreTarget::parse("sqlite://"),
            Err(ConfigError::UnsupportedUrl(_))
        ));
        assert!(matches!(StoreTarget::parse(""), Err(ConfigError::MissingUrl)));
    }
}
