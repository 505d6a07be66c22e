pub mod bot;

pub use bot::BotConfig;
pub use db_infra::config::db::{DbKind, RuntimeEnv};
