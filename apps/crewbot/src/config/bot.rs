use std::env;

use db_infra::config::db::{DbKind, RuntimeEnv};

use crate::error::AppError;

pub const DEFAULT_VOICE_FANOUT: usize = 8;

/// Process configuration read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub runtime_env: RuntimeEnv,
    pub db_kind: DbKind,
    /// Max voice updates in flight during a full reconciliation.
    pub voice_fanout: usize,
}

impl BotConfig {
    pub fn new(runtime_env: RuntimeEnv, db_kind: DbKind) -> Self {
        Self {
            runtime_env,
            db_kind,
            voice_fanout: DEFAULT_VOICE_FANOUT,
        }
    }

    /// `CREWBOT_DB` picks the store (default `sqlite-file`),
    /// `CREWBOT_VOICE_FANOUT` the reconciliation concurrency (default 8).
    pub fn from_env(runtime_env: RuntimeEnv) -> Result<Self, AppError> {
        let db_kind = match env::var("CREWBOT_DB") {
            Ok(raw) => raw.parse::<DbKind>()?,
            Err(_) => DbKind::SqliteFile,
        };

        let voice_fanout = match env::var("CREWBOT_VOICE_FANOUT") {
            Ok(raw) => parse_fanout(&raw)?,
            Err(_) => DEFAULT_VOICE_FANOUT,
        };

        Ok(Self {
            runtime_env,
            db_kind,
            voice_fanout,
        })
    }
}

fn parse_fanout(raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::config(format!(
            "CREWBOT_VOICE_FANOUT must be a positive integer, got '{raw}'"
        ))),
    }
}
