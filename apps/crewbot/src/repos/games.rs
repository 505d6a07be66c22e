//! Game repository functions for domain layer.

use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;
use tracing::debug;

use crate::adapters::games_sea as games_adapter;
use crate::domain::ids::{ChannelId, GuildId, PanelLocation, PlayerId};
use crate::domain::player_ids;
use crate::domain::roster::{Roster, RosterSets};
use crate::entities::games;
use crate::entities::games::GameState;
use crate::errors::domain::DomainError;

/// Game domain model.
///
/// Converted from `games::Model` when loaded through repo functions. The three
/// stored id sets are folded into one `Roster`; a record whose sets overlap or
/// hold malformed ids fails to load as `DataCorruption`.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub panel: PanelLocation,
    pub roster: Roster,
    pub state: GameState,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
    pub lock_version: i32,
}

impl TryFrom<games::Model> for Game {
    type Error = DomainError;

    fn try_from(model: games::Model) -> Result<Self, Self::Error> {
        let sets = RosterSets {
            alive: player_ids::decode(&model.alive_player_ids)?,
            dead: player_ids::decode(&model.dead_player_ids)?,
            spectating: player_ids::decode(&model.spectating_player_ids)?,
        };

        Ok(Self {
            channel_id: model.channel_id.parse()?,
            guild_id: model.guild_id.parse()?,
            panel: PanelLocation::new(
                model.control_panel_channel_id.parse()?,
                model.control_panel_message_id.parse()?,
            ),
            roster: Roster::from_sets(sets)?,
            state: model.state,
            created_at: model.created_at,
            updated_at: model.updated_at,
            lock_version: model.lock_version,
        })
    }
}

pub async fn find_by_channel<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<Option<Game>, DomainError> {
    games_adapter::find_by_channel(conn, channel_id)
        .await?
        .map(Game::try_from)
        .transpose()
}

/// Find the channel's game or return `NotFound(Game)`.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<Game, DomainError> {
    let game = games_adapter::require_game(conn, channel_id).await?;
    Game::try_from(game)
}

/// Fresh copy of `game` from the store. Every read-then-write sequence starts
/// here so decisions are never made on a copy held across an await point.
pub async fn reload<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game: &Game,
) -> Result<Game, DomainError> {
    require_game(conn, game.channel_id).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
    guild_id: GuildId,
    panel: PanelLocation,
    spectators: BTreeSet<PlayerId>,
) -> Result<Game, DomainError> {
    let dto =
        games_adapter::GameCreate::new(channel_id, guild_id, panel).with_spectators(spectators);
    let game = games_adapter::create_game(conn, dto).await?;
    debug!(channel_id = %channel_id, "game record created");
    Game::try_from(game)
}

/// Persist the fields set on `dto` with optimistic locking.
///
/// Returns the updated game; a stale `expected_version` is
/// `Conflict(OptimisticLock)` and nothing is written.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: games_adapter::GameUpdate,
) -> Result<Game, DomainError> {
    let game = games_adapter::update_game(conn, dto).await?;
    Game::try_from(game)
}

pub async fn destroy<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<(), DomainError> {
    games_adapter::delete_game(conn, channel_id).await?;
    debug!(channel_id = %channel_id, "game record deleted");
    Ok(())
}
