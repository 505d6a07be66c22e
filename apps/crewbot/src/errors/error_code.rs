//! Error codes for the crewbot core.
//!
//! Add new codes here; never pass ad-hoc strings as error codes. The chat
//! layer keys its responses off these SCREAMING_SNAKE_CASE strings.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Game rules
    /// Operation not allowed in the current game state
    InvalidTransition,
    /// Roster rule violated (e.g. a dead player dying again)
    InvalidRosterOperation,

    // Resource Not Found
    /// No game is running in the voice channel
    GameNotFound,

    // Conflicts
    /// A game already exists for the voice channel
    GameExists,
    /// The record changed between reload and write
    OptimisticLock,
    /// General conflict
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    ConfigError,
    Internal,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::InvalidRosterOperation => "INVALID_ROSTER_OPERATION",

            Self::GameNotFound => "GAME_NOT_FOUND",

            Self::GameExists => "GAME_EXISTS",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
