use db_infra::DbInfraError;
use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::errors::ErrorCode;
use crate::infra::db_errors::map_db_err;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid transition: {detail}")]
    InvalidTransition { detail: String },
    #[error("Invalid roster operation: {detail}")]
    InvalidRoster { detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Database timeout: {detail}")]
    Timeout { detail: String },
    #[error("Data corruption: {detail}")]
    DataCorruption { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            AppError::InvalidRoster { .. } => ErrorCode::InvalidRosterOperation,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Db { .. } => ErrorCode::DbError,
            AppError::DbUnavailable { .. } => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
            AppError::DataCorruption { .. } => ErrorCode::DataCorruption,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::InvalidTransition { detail }
            | AppError::InvalidRoster { detail }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Db { detail }
            | AppError::DbUnavailable { detail }
            | AppError::Timeout { detail }
            | AppError::DataCorruption { detail }
            | AppError::Config { detail }
            | AppError::Internal { detail } => detail,
        }
    }

    /// Short message the chat layer can show the person who pressed the button.
    /// Rule violations echo the detail; operational failures stay generic.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidTransition { detail } | AppError::InvalidRoster { detail } => {
                format!("That can't be done right now: {detail}.")
            }
            AppError::NotFound { .. } => "There is no game running in this channel.".to_string(),
            AppError::Conflict {
                code: ErrorCode::GameExists,
                ..
            } => "A game is already running in this channel.".to_string(),
            AppError::Conflict { .. } => {
                "The game changed while this was being handled. Please try again.".to_string()
            }
            AppError::Db { .. }
            | AppError::DbUnavailable { .. }
            | AppError::Timeout { .. }
            | AppError::DataCorruption { .. }
            | AppError::Config { .. }
            | AppError::Internal { .. } => {
                "Something went wrong while updating the game.".to_string()
            }
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidTransition { .. } => AppError::InvalidTransition {
                detail: e.to_string(),
            },
            DomainError::InvalidRoster(detail) => AppError::InvalidRoster { detail },
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Game | NotFoundKind::Other(_) => ErrorCode::GameNotFound,
                };
                AppError::NotFound { code, detail }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::GameExists => ErrorCode::GameExists,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::DbUnavailable => AppError::DbUnavailable { detail },
                InfraErrorKind::DataCorruption => AppError::DataCorruption { detail },
                InfraErrorKind::Other(_) => AppError::Db { detail },
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e).into()
    }
}

impl From<DbInfraError> for AppError {
    fn from(e: DbInfraError) -> Self {
        match e {
            DbInfraError::Config { message } => AppError::config(message),
            DbInfraError::Migration { message } => AppError::Db { detail: message },
        }
    }
}
