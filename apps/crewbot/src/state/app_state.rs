use sea_orm::DatabaseConnection;

use crate::config::BotConfig;
use crate::services::coordinator::CoordinatorContext;

/// Shared resources for the bot process.
#[derive(Clone)]
pub struct AppState {
    pub config: BotConfig,
    pub coordinators: CoordinatorContext,
}

impl AppState {
    pub fn new(config: BotConfig, coordinators: CoordinatorContext) -> Self {
        Self {
            config,
            coordinators,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.coordinators.db
    }
}
