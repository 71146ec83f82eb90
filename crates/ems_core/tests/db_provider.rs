use ems_core::db::migrations::{current_user_version, latest_version};
use ems_core::db::{StoreTarget, UNICODE_LOWER_FN};
use ems_core::{
    ConfigError, ConfigSource, ConnectionProvider, DatabaseSettings, DbError, ErrorKind,
    SqliteConnectionProvider,
};
use std::collections::HashSet;

fn file_settings(path: &std::path::Path) -> DatabaseSettings {
    let mut settings = DatabaseSettings::in_memory();
    settings.url = format!("sqlite://{}", path.display());
    settings
}

fn table_names(provider: &SqliteConnectionProvider) -> HashSet<String> {
    let conn = provider.acquire().unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table';")
        .unwrap();
    let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
    rows.collect::<Result<HashSet<_>, _>>().unwrap()
}

#[test]
fn in_memory_provider_applies_schema() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    assert_eq!(provider.target(), &StoreTarget::Memory);

    let tables = table_names(&provider);
    assert!(tables.contains("employee"));
    assert!(tables.contains("paystatement"));

    let conn = provider.acquire().unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
}

#[test]
fn acquired_connections_enforce_foreign_keys() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let conn = provider.acquire().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn acquired_connections_fold_unicode_case() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let conn = provider.acquire().unwrap();
    let folded: String = conn
        .query_row(&format!("SELECT {UNICODE_LOWER_FN}('ØSTER Élodie');"), [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(folded, "øster élodie");

    let null: Option<String> = conn
        .query_row(&format!("SELECT {UNICODE_LOWER_FN}(NULL);"), [], |row| row.get(0))
        .unwrap();
    assert_eq!(null, None);
}

#[test]
fn in_memory_providers_do_not_share_rows() {
    let first = SqliteConnectionProvider::in_memory().unwrap();
    let second = SqliteConnectionProvider::in_memory().unwrap();

    first
        .acquire()
        .unwrap()
        .execute(
            "INSERT INTO employee (firstName, lastName, ssn, jobTitle, division, salary)
             VALUES ('Ada', 'Lovelace', '111223333', 'Analyst', 'R&D', 1000.0);",
            [],
        )
        .unwrap();

    let count = |provider: &SqliteConnectionProvider| -> i64 {
        provider
            .acquire()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM employee;", [], |row| row.get(0))
            .unwrap()
    };
    assert_eq!(count(&first), 1);
    assert_eq!(count(&second), 0);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ems.db");

    {
        let provider = SqliteConnectionProvider::new(file_settings(&path)).unwrap();
        provider
            .acquire()
            .unwrap()
            .execute(
                "INSERT INTO employee (firstName, lastName, ssn, jobTitle, division, salary)
                 VALUES ('Ada', 'Lovelace', '111223333', 'Analyst', 'R&D', 1000.0);",
                [],
            )
            .unwrap();
    }

    let reopened = SqliteConnectionProvider::new(file_settings(&path)).unwrap();
    let count: i64 = reopened
        .acquire()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM employee;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
            .unwrap();
    }

    let err = match SqliteConnectionProvider::new(file_settings(&path)) {
        Ok(_) => panic!("newer schema must be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { .. }));
    assert_eq!(err.kind(), ErrorKind::DataAccess);
}

#[test]
fn foreign_store_url_is_configuration_error() {
    let mut settings = DatabaseSettings::in_memory();
    settings.url = "jdbc:mysql://localhost:3306/employeeData".to_string();

    let err = match SqliteConnectionProvider::new(settings) {
        Ok(_) => panic!("jdbc urls are not supported"),
        Err(err) => err,
    };
    assert!(matches!(err, DbError::Config(ConfigError::UnsupportedUrl(_))));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn provider_built_from_config_reports_connection_info() {
    let config = ConfigSource::from_toml_str(
        r#"
[db]
url = "sqlite::memory:"
username = "hr"
password = "hunter2"
"#,
    )
    .unwrap()
    .with_env(|_| None);
    let settings = DatabaseSettings::from_config(&config).unwrap();
    let provider = SqliteConnectionProvider::new(settings).unwrap();

    assert!(provider.test_connection());
    let info = provider.connection_info();
    assert!(info.contains("Database URL: sqlite::memory:"));
    assert!(info.contains("Username: hr"));
    assert!(info.contains("Driver: sqlite"));
    assert!(!info.contains("hunter2"));
}
