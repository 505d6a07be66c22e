use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, trace, warn};

use crate::config::db::{make_conn_spec, validate_db_config, DbKind, DbOwner, RuntimeEnv};
use crate::error::DbInfraError;

fn get_db_engine(db_kind: DbKind) -> &'static str {
    match db_kind {
        DbKind::Postgres => "postgresql",
        DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
    }
}

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        DbInfraError::config("no error recorded after max attempts")
    }))
}

async fn connect(
    opt: ConnectOptions,
    db_kind: DbKind,
    purpose: &str,
) -> Result<DatabaseConnection, DbInfraError> {
    let connect_once = || {
        let opt = opt.clone();
        async move {
            Database::connect(opt).await.map_err(|e| {
                DbInfraError::config(format!("failed to connect to database ({purpose}): {e}"))
            })
        }
    };

    if matches!(db_kind, DbKind::Postgres) {
        retry_connection(connect_once, 5, 500).await
    } else {
        connect_once().await
    }
}

fn connect_options(url: &str, db_kind: DbKind, max_connections: u32) -> ConnectOptions {
    let mut opt = ConnectOptions::new(url);
    // Every connection to `sqlite::memory:` is its own database, so the pool must
    // never grow past the single connection the schema was migrated on.
    let max = if db_kind == DbKind::SqliteMemory {
        1
    } else {
        max_connections
    };
    opt.min_connections(1)
        .max_connections(max)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    opt
}

/// Single-connection pool with owner credentials, used for migrations.
pub async fn build_admin_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = make_conn_spec(env, db_kind, DbOwner::Owner)?;
    connect(connect_options(&url, db_kind, 1), db_kind, "admin pool").await
}

/// Sanitize database URL by masking password in connection strings.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.split_once('@') else {
        return url.to_string();
    };

    match auth_part.rfind(':') {
        Some(colon_pos) if auth_part[..colon_pos].contains("://") => {
            format!("{}:***@{}", &auth_part[..colon_pos], host_part)
        }
        _ => url.to_string(),
    }
}

async fn fast_path_schema_check(conn: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let expected_last = Migrator::migrations()
        .last()
        .map(|m| m.name().to_string())
        .unwrap_or_default();

    let applied = match Migrator::get_applied_migrations(conn).await {
        Ok(migrations) => migrations,
        Err(DbErr::Exec(_)) => {
            trace!(fastpath = "miss", reason = "migration_table_missing");
            return Ok(false);
        }
        Err(e) => {
            return Err(DbInfraError::Migration {
                message: format!("failed to get applied migrations: {e}"),
            });
        }
    };

    let current_last = applied.last().map(|m| m.name().to_string());
    let is_up_to_date = applied.len() == Migrator::migrations().len()
        && !expected_last.is_empty()
        && current_last.as_deref() == Some(expected_last.as_str());

    trace!(
        fastpath = if is_up_to_date { "hit" } else { "miss" },
        applied_count = applied.len(),
        expected_last = %expected_last
    );

    Ok(is_up_to_date)
}

pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    validate_db_config(env, db_kind)?;

    let admin_pool = build_admin_pool(env, db_kind).await?;
    orchestrate_migration_internal(&admin_pool, env, db_kind, command).await
}

pub async fn orchestrate_migration_internal(
    pool: &DatabaseConnection,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    info!(
        "migrate=start env={:?} db_kind={:?} engine={} command={:?}",
        env,
        db_kind,
        get_db_engine(db_kind),
        command
    );

    if matches!(command, MigrationCommand::Up) && fast_path_schema_check(pool).await? {
        info!("migrate=skipped up_to_date=true");
        return Ok(());
    }

    migrate(pool, command)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: format!("migration execution failed: {e}"),
        })?;

    info!("migrate=done");
    Ok(())
}

/// Connect the application pool and bring the schema up to date on it.
///
/// For `SqliteMemory` the schema is created on the same single connection that
/// is handed back, otherwise the tables would live in a different database.
pub async fn bootstrap_db(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    validate_db_config(env, db_kind)?;

    match db_kind {
        DbKind::SqliteMemory => {
            let url = make_conn_spec(env, db_kind, DbOwner::App)?;
            let pool = connect(connect_options(&url, db_kind, 1), db_kind, "app pool").await?;
            orchestrate_migration_internal(&pool, env, db_kind, MigrationCommand::Up).await?;
            Ok(pool)
        }
        DbKind::SqliteFile | DbKind::Postgres => {
            orchestrate_migration(env, db_kind, MigrationCommand::Up).await?;
            let url = make_conn_spec(env, db_kind, DbOwner::App)?;
            info!(url = %sanitize_db_url(&url), "db=connect");
            connect(connect_options(&url, db_kind, 8), db_kind, "app pool").await
        }
    }
}
