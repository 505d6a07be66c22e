//! Player roster for one game.
//!
//! A single `PlayerId -> Role` map is the source of truth, so a player can
//! never sit in two rosters at once. The alive/dead/spectating sets only exist
//! as views (and at the persistence boundary).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Alive,
    Dead,
    Spectator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Alive, Role::Dead, Role::Spectator];

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Alive => "Alive",
            Role::Dead => "Dead",
            Role::Spectator => "Spectator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Only alive players can die.
    NotAlive {
        player_id: PlayerId,
        role: Option<Role>,
    },
    /// Stored rosters listed the same player twice.
    DuplicateMembership {
        player_id: PlayerId,
        first: Role,
        second: Role,
    },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::NotAlive {
                player_id,
                role: Some(role),
            } => write!(f, "player {player_id} is {role}, not alive"),
            RosterError::NotAlive {
                player_id,
                role: None,
            } => write!(f, "player {player_id} is not part of this game"),
            RosterError::DuplicateMembership {
                player_id,
                first,
                second,
            } => write!(f, "player {player_id} is listed as both {first} and {second}"),
        }
    }
}

impl std::error::Error for RosterError {}

/// The three rosters split out, each sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSets {
    pub alive: BTreeSet<PlayerId>,
    pub dead: BTreeSet<PlayerId>,
    pub spectating: BTreeSet<PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: BTreeMap<PlayerId, Role>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh game: everyone currently in voice starts out spectating.
    pub fn from_spectators(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            members: players
                .into_iter()
                .map(|id| (id, Role::Spectator))
                .collect(),
        }
    }

    /// Rebuild from the three stored sets, rejecting overlaps.
    pub fn from_sets(sets: RosterSets) -> Result<Self, RosterError> {
        let mut members = BTreeMap::new();
        let tagged = [
            (Role::Alive, sets.alive),
            (Role::Dead, sets.dead),
            (Role::Spectator, sets.spectating),
        ];

        for (role, ids) in tagged {
            for id in ids {
                if let Some(first) = members.insert(id, role) {
                    return Err(RosterError::DuplicateMembership {
                        player_id: id,
                        first,
                        second: role,
                    });
                }
            }
        }

        Ok(Self { members })
    }

    pub fn to_sets(&self) -> RosterSets {
        let mut sets = RosterSets::default();
        for (&id, role) in &self.members {
            match role {
                Role::Alive => sets.alive.insert(id),
                Role::Dead => sets.dead.insert(id),
                Role::Spectator => sets.spectating.insert(id),
            };
        }
        sets
    }

    pub fn role_of(&self, player_id: PlayerId) -> Option<Role> {
        self.members.get(&player_id).copied()
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.members.contains_key(&player_id)
    }

    /// Track a newcomer as a spectator. Returns `false` (and changes nothing)
    /// when the player already holds a role.
    pub fn add_spectator(&mut self, player_id: PlayerId) -> bool {
        if self.members.contains_key(&player_id) {
            return false;
        }
        self.members.insert(player_id, Role::Spectator);
        true
    }

    pub fn mark_dead(&mut self, player_id: PlayerId) -> Result<(), RosterError> {
        match self.members.get_mut(&player_id) {
            Some(role) if *role == Role::Alive => {
                *role = Role::Dead;
                Ok(())
            }
            other => Err(RosterError::NotAlive {
                player_id,
                role: other.map(|r| *r),
            }),
        }
    }

    /// Start of a round: every tracked player is alive, nobody dead or spectating.
    pub fn start_round(&mut self) {
        for role in self.members.values_mut() {
            *role = Role::Alive;
        }
    }

    /// Players holding `role`, in ascending id order.
    pub fn with_role(&self, role: Role) -> Vec<PlayerId> {
        self.members
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn alive(&self) -> Vec<PlayerId> {
        self.with_role(Role::Alive)
    }

    pub fn dead(&self) -> Vec<PlayerId> {
        self.with_role(Role::Dead)
    }

    pub fn spectating(&self) -> Vec<PlayerId> {
        self.with_role(Role::Spectator)
    }

    pub fn players(&self) -> impl Iterator<Item = (PlayerId, Role)> + '_ {
        self.members.iter().map(|(id, role)| (*id, *role))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
