//! DTOs for games_sea adapter.

use std::collections::BTreeSet;

use crate::domain::ids::{ChannelId, GuildId, PanelLocation, PlayerId};
use crate::domain::roster::RosterSets;
use crate::entities::games::GameState;

/// DTO for creating a new game. New games always start in `created` with
/// every seeded player spectating.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub panel: PanelLocation,
    pub spectators: BTreeSet<PlayerId>,
}

impl GameCreate {
    pub fn new(channel_id: ChannelId, guild_id: GuildId, panel: PanelLocation) -> Self {
        Self {
            channel_id,
            guild_id,
            panel,
            spectators: BTreeSet::new(),
        }
    }

    pub fn with_spectators(mut self, spectators: impl IntoIterator<Item = PlayerId>) -> Self {
        self.spectators.extend(spectators);
        self
    }
}

/// Unified DTO for updating game fields with optimistic locking.
///
/// Any combination of state, rosters and panel location is written atomically
/// with a single version increment. `expected_version` must match the stored
/// `lock_version` or nothing is written.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub channel_id: ChannelId,
    pub state: Option<GameState>,
    pub rosters: Option<RosterSets>,
    pub panel: Option<PanelLocation>,
    pub expected_version: i32,
}

impl GameUpdate {
    pub fn new(channel_id: ChannelId, expected_version: i32) -> Self {
        Self {
            channel_id,
            state: None,
            rosters: None,
            panel: None,
            expected_version,
        }
    }

    pub fn with_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_rosters(mut self, rosters: RosterSets) -> Self {
        self.rosters = Some(rosters);
        self
    }

    pub fn with_panel(mut self, panel: PanelLocation) -> Self {
        self.panel = Some(panel);
        self
    }
}
