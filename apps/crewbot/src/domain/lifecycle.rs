//! Game lifecycle state machine.
//!
//! `created -> playing <-> meeting -> ended`, where `ended` is only visited
//! right before the record is deleted. A stored `ended` record is an
//! interrupted deletion, so ending it again is allowed and finishes the job.
//! Every operation the coordinator exposes is checked against [`next_state`]
//! before anything is written.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::games::GameState;
use crate::errors::domain::DomainError;

/// The two states in which voice restrictions apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    Playing,
    Meeting,
}

impl GameState {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameState::Created => "created",
            GameState::Playing => "playing",
            GameState::Meeting => "meeting",
            GameState::Ended => "ended",
        }
    }

    /// `None` outside an active round (`created`, `ended`).
    pub const fn round_phase(self) -> Option<RoundPhase> {
        match self {
            GameState::Playing => Some(RoundPhase::Playing),
            GameState::Meeting => Some(RoundPhase::Meeting),
            GameState::Created | GameState::Ended => None,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    StartGame,
    StartMeeting,
    EndMeeting,
    EndGame,
    PlayerDied,
    PlayerJoined,
    PlayerLeft,
    RelocatePanel,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::StartGame => "start_game",
            Operation::StartMeeting => "start_meeting",
            Operation::EndMeeting => "end_meeting",
            Operation::EndGame => "end_game",
            Operation::PlayerDied => "player_died",
            Operation::PlayerJoined => "player_joined",
            Operation::PlayerLeft => "player_left",
            Operation::RelocatePanel => "relocate_panel",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State the game is in after `operation`, or `InvalidTransition` when the
/// operation is not allowed from `from`.
pub fn next_state(from: GameState, operation: Operation) -> Result<GameState, DomainError> {
    use GameState::{Created, Ended, Meeting, Playing};

    let next = match (operation, from) {
        (Operation::StartGame, Created) => Some(Playing),
        (Operation::StartMeeting, Playing) => Some(Meeting),
        (Operation::EndMeeting, Meeting) => Some(Playing),
        (Operation::EndGame, _) => Some(Ended),
        (Operation::PlayerDied, Playing | Meeting) => Some(from),
        (Operation::PlayerJoined | Operation::PlayerLeft, _) => Some(from),
        (Operation::RelocatePanel, Created | Playing | Meeting) => Some(from),
        _ => None,
    };

    next.ok_or(DomainError::InvalidTransition { from, operation })
}

pub fn is_allowed(from: GameState, operation: Operation) -> bool {
    next_state(from, operation).is_ok()
}
