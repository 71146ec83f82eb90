//! File + environment configuration for store connectivity and logging.
//!
//! # Responsibility
//! - Load dotted-key settings from a TOML file (`[db] url = ".."` is
//!   `db.url`).
//! - Apply environment overrides: `db.url` is overridden by `DB_URL`.
//! - Resolve typed database settings for the connection provider.
//!
//! # Invariants
//! - Environment values take precedence over file values; empty
//!   environment values count as absent.
//! - A missing or empty store URL is a configuration failure, never a
//!   connectivity failure.
//! - The password is never rendered by `Display`/`Debug` of settings.

use crate::error::ErrorKind;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_URL_KEY: &str = "db.url";
pub const DB_USERNAME_KEY: &str = "db.username";
pub const DB_PASSWORD_KEY: &str = "db.password";
pub const DB_DRIVER_KEY: &str = "db.driver";
pub const DB_CONNECTION_TIMEOUT_KEY: &str = "db.connection.timeout";
pub const LOG_LEVEL_KEY: &str = "log.level";
pub const LOG_DIR_KEY: &str = "log.dir";

pub const SUPPORTED_DRIVER: &str = "sqlite";
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 30_000;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading/resolution failure.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: String,
        source: toml::de::Error,
    },
    /// `db.url` is absent or blank.
    MissingUrl,
    UnsupportedDriver(String),
    UnsupportedUrl(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { origin, source } => write!(f, "invalid config in {origin}: {source}"),
            Self::MissingUrl => write!(f, "database URL is not configured (`{DB_URL_KEY}`)"),
            Self::UnsupportedDriver(driver) => write!(
                f,
                "unsupported database driver `{driver}`; expected `{SUPPORTED_DRIVER}`"
            ),
            Self::UnsupportedUrl(url) => write!(f, "unsupported database URL `{url}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingUrl | Self::UnsupportedDriver(_) | Self::UnsupportedUrl(_) => None,
        }
    }
}

type EnvLookup = fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Dotted-key settings with environment overrides.
#[derive(Clone)]
pub struct ConfigSource {
    values: BTreeMap<String, String>,
    env: EnvLookup,
}

impl Debug for ConfigSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSource")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigSource {
    /// Loads a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&text, &format!("`{}`", path.display()))
    }

    /// Parses TOML text; nested tables become dotted keys.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Self::parse_toml(text, "inline config")
    }

    /// Builds a source from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            env: process_env,
        }
    }

    /// Replaces the environment lookup used for overrides.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Returns the effective value for a dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = (self.env)(&env_key(key)).filter(|value| !value.is_empty()) {
            return Some(value);
        }
        self.values.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_toml(text: &str, origin: &str) -> ConfigResult<Self> {
        let table: toml::Table = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let mut values = BTreeMap::new();
        flatten_table("", &table, &mut values);
        Ok(Self {
            values,
            env: process_env,
        })
    }
}

/// Maps `db.connection.timeout` to `DB_CONNECTION_TIMEOUT`.
pub fn env_key(key: &str) -> String {
    key.to_ascii_uppercase().replace('.', "_")
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten_table(&dotted, nested, out),
            toml::Value::String(text) => {
                out.insert(dotted, text.clone());
            }
            toml::Value::Integer(number) => {
                out.insert(dotted, number.to_string());
            }
            toml::Value::Float(number) => {
                out.insert(dotted, number.to_string());
            }
            toml::Value::Boolean(flag) => {
                out.insert(dotted, flag.to_string());
            }
            toml::Value::Datetime(datetime) => {
                out.insert(dotted, datetime.to_string());
            }
            // Arrays have no dotted-key form.
            toml::Value::Array(_) => {}
        }
    }
}

/// Resolved store connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: String,
    pub driver: String,
    /// Applied as the SQLite busy timeout on every acquired connection.
    pub connection_timeout: Duration,
}

impl Debug for DatabaseSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("driver", &self.driver)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

impl DatabaseSettings {
    /// Resolves settings from `db.*` keys.
    ///
    /// # Errors
    /// - `MissingUrl` when `db.url` is absent or blank.
    /// - `UnsupportedDriver` when `db.driver` names anything but `sqlite`.
    pub fn from_config(config: &ConfigSource) -> ConfigResult<Self> {
        let url = config
            .get(DB_URL_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        let driver = config
            .get_or(DB_DRIVER_KEY, SUPPORTED_DRIVER)
            .trim()
            .to_ascii_lowercase();
        if driver != SUPPORTED_DRIVER {
            return Err(ConfigError::UnsupportedDriver(driver));
        }

        let timeout_ms = config
            .get(DB_CONNECTION_TIMEOUT_KEY)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS);

        Ok(Self {
            url,
            username: config
                .get(DB_USERNAME_KEY)
                .filter(|value| !value.trim().is_empty()),
            password: config.get_or(DB_PASSWORD_KEY, ""),
            driver,
            connection_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Settings for a private in-memory store.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            username: None,
            password: String::new(),
            driver: SUPPORTED_DRIVER.to_string(),
            connection_timeout: Duration::from_millis(DEFAULT_CONNECTION_TIMEOUT_MS),
        }
    }
}
