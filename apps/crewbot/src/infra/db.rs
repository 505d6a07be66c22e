use db_infra::config::db::{DbKind, RuntimeEnv};
use sea_orm::DatabaseConnection;

use crate::error::AppError;

/// Connect and bring the schema up to date. The single entry point for both
/// the bot process and tests.
pub async fn connect_db(env: RuntimeEnv, kind: DbKind) -> Result<DatabaseConnection, AppError> {
    Ok(db_infra::bootstrap_db(env, kind).await?)
}
