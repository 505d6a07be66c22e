use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum GameState {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "playing")]
    Playing,
    #[sea_orm(string_value = "meeting")]
    Meeting,
    #[sea_orm(string_value = "ended")]
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: String,
    pub guild_id: String,
    pub control_panel_channel_id: String,
    pub control_panel_message_id: String,
    #[sea_orm(column_type = "Text")]
    pub alive_player_ids: String,
    #[sea_orm(column_type = "Text")]
    pub dead_player_ids: String,
    #[sea_orm(column_type = "Text")]
    pub spectating_player_ids: String,
    pub state: GameState,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub lock_version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
