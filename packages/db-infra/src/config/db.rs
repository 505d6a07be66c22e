use std::env;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::DbInfraError;

/// Runtime environment the connection is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    Test,
}

/// Storage engine backing the games table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbKind::Postgres),
            "sqlite-file" | "sqlite" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!(
                "unsupported database kind '{other}' \
                 (expected postgres | sqlite-file | sqlite-memory)"
            ))),
        }
    }
}

/// Database owner enum for different access levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (limited permissions)
    App,
    /// Owner-level access (full permissions for migrations)
    Owner,
}

const DEFAULT_SQLITE_PATH: &str = "crewbot.sqlite";
const DEFAULT_TEST_SQLITE_PATH: &str = "crewbot_test.sqlite";

/// Builds the connection string for the given environment, engine and owner.
pub fn make_conn_spec(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    match db_kind {
        DbKind::Postgres => postgres_url(env, owner),
        DbKind::SqliteFile => Ok(format!("sqlite://{}?mode=rwc", sqlite_file_spec(db_kind, env)?)),
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Resolve the on-disk path of a SQLite file database.
pub fn sqlite_file_spec(db_kind: DbKind, env: RuntimeEnv) -> Result<String, DbInfraError> {
    if db_kind != DbKind::SqliteFile {
        return Err(DbInfraError::config(
            "sqlite_file_spec only applies to the sqlite-file database kind",
        ));
    }

    let path = env::var("CREWBOT_SQLITE_PATH").unwrap_or_else(|_| match env {
        RuntimeEnv::Prod => DEFAULT_SQLITE_PATH.to_string(),
        RuntimeEnv::Test => DEFAULT_TEST_SQLITE_PATH.to_string(),
    });

    if path.trim().is_empty() {
        return Err(DbInfraError::config("CREWBOT_SQLITE_PATH must not be empty"));
    }

    Ok(path)
}

/// Reject configurations that would point tests at production data.
pub fn validate_db_config(env: RuntimeEnv, db_kind: DbKind) -> Result<(), DbInfraError> {
    if env != RuntimeEnv::Test {
        return Ok(());
    }

    match db_kind {
        DbKind::Postgres => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(())
        }
        DbKind::SqliteFile => {
            let path = sqlite_file_spec(db_kind, env)?;
            if !path.ends_with("_test.sqlite") {
                return Err(DbInfraError::config(format!(
                    "Test profile requires sqlite file to end with '_test.sqlite', \
                     but got: '{path}'"
                )));
            }
            Ok(())
        }
        DbKind::SqliteMemory => Ok(()),
    }
}

fn postgres_url(env: RuntimeEnv, owner: DbOwner) -> Result<String, DbInfraError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = match env {
        RuntimeEnv::Prod => must_var("PROD_DB")?,
        RuntimeEnv::Test => must_var("TEST_DB")?,
    };
    let (username, password) = match owner {
        DbOwner::App => (must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?),
        DbOwner::Owner => (must_var("CREWBOT_OWNER_USER")?, must_var("CREWBOT_OWNER_PASSWORD")?),
    };
    let password = utf8_percent_encode(&password, NON_ALPHANUMERIC);

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
