//! SeaORM adapter for the games table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::domain::ids::ChannelId;
use crate::domain::player_ids;
use crate::entities::games;
use crate::infra::db_errors::{GAME_NOT_FOUND_PREFIX, OPTIMISTIC_LOCK_PREFIX};

pub mod dto;

pub use dto::{GameCreate, GameUpdate};

fn not_found(channel_id: ChannelId) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("{GAME_NOT_FOUND_PREFIX}{channel_id}"))
}

/// Apply an optimistic update with lock version check, then refetch.
///
/// - adds the lock_version increment and updated_at to the update
/// - filters by channel and the expected lock_version
/// - on zero rows affected, distinguishes NotFound from OptimisticLock
async fn optimistic_update_then_fetch<C, F>(
    conn: &C,
    channel_id: ChannelId,
    expected_version: i32,
    configure_update: F,
) -> Result<games::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(sea_orm::UpdateMany<games::Entity>) -> sea_orm::UpdateMany<games::Entity>,
{
    let now = time::OffsetDateTime::now_utc();
    let key = channel_id.to_string();

    let result = configure_update(games::Entity::update_many())
        .col_expr(games::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            games::Column::LockVersion,
            Expr::col(games::Column::LockVersion).add(1),
        )
        .filter(games::Column::ChannelId.eq(key.as_str()))
        .filter(games::Column::LockVersion.eq(expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match games::Entity::find_by_id(key.clone()).one(conn).await? {
            Some(game) => Err(sea_orm::DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{},\"actual\":{}}}",
                expected_version, game.lock_version
            ))),
            None => Err(not_found(channel_id)),
        };
    }

    games::Entity::find_by_id(key)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(channel_id))
}

pub async fn find_by_channel<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(channel_id.to_string())
        .one(conn)
        .await
}

/// Find the channel's game or return a `GAME_NOT_FOUND` error.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<games::Model, sea_orm::DbErr> {
    find_by_channel(conn, channel_id)
        .await?
        .ok_or_else(|| not_found(channel_id))
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let game_active = games::ActiveModel {
        channel_id: Set(dto.channel_id.to_string()),
        guild_id: Set(dto.guild_id.to_string()),
        control_panel_channel_id: Set(dto.panel.channel_id.to_string()),
        control_panel_message_id: Set(dto.panel.message_id.to_string()),
        alive_player_ids: Set(String::new()),
        dead_player_ids: Set(String::new()),
        spectating_player_ids: Set(player_ids::encode(&dto.spectators)),
        state: Set(games::GameState::Created),
        created_at: Set(now),
        updated_at: Set(now),
        lock_version: Set(1),
    };

    game_active.insert(conn).await
}

pub async fn update_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameUpdate,
) -> Result<games::Model, sea_orm::DbErr> {
    optimistic_update_then_fetch(conn, dto.channel_id, dto.expected_version, |mut update| {
        if let Some(state) = dto.state {
            update = update.col_expr(games::Column::State, Expr::val(state.to_value()).into());
        }
        if let Some(rosters) = &dto.rosters {
            update = update
                .col_expr(
                    games::Column::AlivePlayerIds,
                    Expr::val(player_ids::encode(&rosters.alive)).into(),
                )
                .col_expr(
                    games::Column::DeadPlayerIds,
                    Expr::val(player_ids::encode(&rosters.dead)).into(),
                )
                .col_expr(
                    games::Column::SpectatingPlayerIds,
                    Expr::val(player_ids::encode(&rosters.spectating)).into(),
                );
        }
        if let Some(panel) = dto.panel {
            update = update
                .col_expr(
                    games::Column::ControlPanelChannelId,
                    Expr::val(panel.channel_id.to_string()).into(),
                )
                .col_expr(
                    games::Column::ControlPanelMessageId,
                    Expr::val(panel.message_id.to_string()).into(),
                );
        }
        update
    })
    .await
}

pub async fn delete_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
) -> Result<(), sea_orm::DbErr> {
    let result = games::Entity::delete_by_id(channel_id.to_string())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(not_found(channel_id));
    }
    Ok(())
}
