//! Seams to the chat platform. The coordinator only ever talks to voice and to
//! the control panel through these traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ids::{ChannelId, GuildId, MessageId, PanelLocation, PlayerId};
use crate::domain::panel_view::PanelView;
use crate::domain::voice_policy::VoiceState;

/// Failure of a single external call. Never turned into an `AppError`: the
/// record write it follows has already happened and stands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("channel {0} no longer exists")]
    ChannelNotFound(ChannelId),
    #[error("message {0} no longer exists")]
    MessageNotFound(MessageId),
    #[error("member {0} is not connected to voice")]
    MemberNotInVoice(PlayerId),
    #[error("missing permission: {0}")]
    MissingPermission(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn set_voice_state(
        &self,
        guild_id: GuildId,
        player_id: PlayerId,
        state: VoiceState,
    ) -> Result<(), GatewayError>;

    /// Members currently connected to a voice channel.
    async fn channel_members(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Vec<PlayerId>, GatewayError>;
}

#[async_trait]
pub trait PanelSurface: Send + Sync {
    /// Show `view` at `location`. `Ok(Some(_))` when the panel had to be
    /// re-posted somewhere else, `Ok(None)` when it was edited in place.
    async fn publish(
        &self,
        location: PanelLocation,
        view: &PanelView,
    ) -> Result<Option<PanelLocation>, GatewayError>;
}
