pub use sea_orm_migration::prelude::*;
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

mod m20261016_000001_games; // keep filename + module name in sync

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261016_000001_games::Migration)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl MigrationCommand {
    /// `Status` only reads the migration table.
    pub fn changes_schema(self) -> bool {
        !matches!(self, MigrationCommand::Status)
    }
}

/// Run `command` against an already connected database.
///
/// Shared by the CLI and the bot's startup path; neither reads the
/// environment here.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let target = database_name(db).await?;
    let defined = Migrator::migrations().len();

    tracing::info!(
        ?command,
        ?backend,
        database = %target,
        defined,
        applied = count_applied_migrations(db).await.unwrap_or(0),
        "migration starting"
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    if let Err(e) = result {
        tracing::error!(?command, database = %target, error = %e, "migration failed");
        return Err(e);
    }

    if command.changes_schema() {
        tracing::info!(
            ?command,
            defined,
            applied = count_applied_migrations(db).await.unwrap_or(0),
            "migration finished"
        );
    }
    Ok(())
}

async fn database_name(db: &DatabaseConnection) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Postgres => "select current_database() as name",
        DatabaseBackend::Sqlite => {
            "select file as name from pragma_database_list where name = 'main'"
        }
        _ => return Ok("<unsupported>".to_string()),
    };

    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?;
    let name = row
        .and_then(|row| row.try_get::<String>("", "name").ok())
        .unwrap_or_else(|| "<unknown>".to_string());

    // SQLite reports an empty file name for in-memory databases.
    Ok(if name.is_empty() {
        ":memory:".to_string()
    } else {
        name
    })
}

/// Number of applied migrations; 0 when the migration table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}
