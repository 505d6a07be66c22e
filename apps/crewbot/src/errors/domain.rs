//! Domain-level error type used across services and adapters.
//!
//! This error type is chat- and DB-agnostic. Coordinator operations return
//! `Result<T, crate::error::AppError>` and convert from `DomainError` using the
//! provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::ids::ParseIdError;
use crate::domain::lifecycle::Operation;
use crate::domain::roster::RosterError;
use crate::entities::games::GameState;

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A game is already running in that voice channel.
    GameExists,
    OptimisticLock,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Operation not permitted from the game's current state
    InvalidTransition {
        from: GameState,
        operation: Operation,
    },
    /// Roster rule violation, e.g. killing a player who is not alive
    InvalidRoster(String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::InvalidTransition { from, operation } => {
                write!(f, "invalid transition: {operation} is not allowed while {from}")
            }
            DomainError::InvalidRoster(d) => write!(f, "invalid roster operation: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn invalid_roster(detail: impl Into<String>) -> Self {
        Self::InvalidRoster(detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
}

impl From<RosterError> for DomainError {
    fn from(e: RosterError) -> Self {
        match e {
            RosterError::NotAlive { .. } => DomainError::invalid_roster(e.to_string()),
            // Only reachable when loading a stored record with overlapping sets.
            RosterError::DuplicateMembership { .. } => {
                DomainError::infra(InfraErrorKind::DataCorruption, e.to_string())
            }
        }
    }
}

impl From<ParseIdError> for DomainError {
    fn from(e: ParseIdError) -> Self {
        DomainError::infra(InfraErrorKind::DataCorruption, e.to_string())
    }
}
