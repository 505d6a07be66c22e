//! Role policy table: how each role may use voice in each round phase.
//!
//! Built once at startup and handed to the reconciler. Outside an active round
//! (`created`, `ended`) everyone is unrestricted, whatever their role.

use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::RoundPhase;
use crate::domain::roster::Role;
use crate::entities::games::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VoiceState {
    pub deafened: bool,
    pub muted: bool,
}

impl VoiceState {
    pub const UNRESTRICTED: VoiceState = VoiceState {
        deafened: false,
        muted: false,
    };
    pub const MUTED: VoiceState = VoiceState {
        deafened: false,
        muted: true,
    };
    pub const SILENCED: VoiceState = VoiceState {
        deafened: true,
        muted: true,
    };
}

/// Indexed by `[role][phase]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePolicy {
    table: [[VoiceState; 2]; 3],
}

impl Default for VoicePolicy {
    /// Alive players are cut off from each other while playing and talk freely
    /// in meetings; dead players chat among themselves while the round runs
    /// but are muted in meetings; spectators are always muted.
    fn default() -> Self {
        Self::new(|role, phase| match (role, phase) {
            (Role::Alive, RoundPhase::Playing) => VoiceState::SILENCED,
            (Role::Alive, RoundPhase::Meeting) => VoiceState::UNRESTRICTED,
            (Role::Dead, RoundPhase::Playing) => VoiceState::UNRESTRICTED,
            (Role::Dead, RoundPhase::Meeting) => VoiceState::MUTED,
            (Role::Spectator, _) => VoiceState::MUTED,
        })
    }
}

impl VoicePolicy {
    /// Build a table by evaluating `rule` once for every role and phase.
    pub fn new(rule: impl Fn(Role, RoundPhase) -> VoiceState) -> Self {
        let mut table = [[VoiceState::UNRESTRICTED; 2]; 3];
        for role in Role::ALL {
            for phase in [RoundPhase::Playing, RoundPhase::Meeting] {
                table[role_index(role)][phase_index(phase)] = rule(role, phase);
            }
        }
        Self { table }
    }

    pub fn expected(&self, role: Role, phase: RoundPhase) -> VoiceState {
        self.table[role_index(role)][phase_index(phase)]
    }

    /// Voice state for `role` in any game state.
    pub fn resolve(&self, role: Role, state: GameState) -> VoiceState {
        match state.round_phase() {
            Some(phase) => self.expected(role, phase),
            None => VoiceState::UNRESTRICTED,
        }
    }
}

const fn role_index(role: Role) -> usize {
    match role {
        Role::Alive => 0,
        Role::Dead => 1,
        Role::Spectator => 2,
    }
}

const fn phase_index(phase: RoundPhase) -> usize {
    match phase {
        RoundPhase::Playing => 0,
        RoundPhase::Meeting => 1,
    }
}
