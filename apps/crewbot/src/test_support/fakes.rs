use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::ids::{ChannelId, GuildId, PanelLocation, PlayerId};
use crate::domain::panel_view::PanelView;
use crate::domain::voice_policy::VoiceState;
use crate::services::gateway::{GatewayError, PanelSurface, VoiceGateway};

/// Voice gateway that records every update and can be told to fail for
/// particular players.
#[derive(Debug, Default)]
pub struct RecordingVoiceGateway {
    members: Mutex<HashMap<ChannelId, Vec<PlayerId>>>,
    listing_error: Mutex<Option<GatewayError>>,
    failures: Mutex<HashMap<PlayerId, GatewayError>>,
    updates: Mutex<Vec<(GuildId, PlayerId, VoiceState)>>,
}

impl RecordingVoiceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(
        self,
        channel_id: ChannelId,
        members: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        self.members
            .lock()
            .insert(channel_id, members.into_iter().collect());
        self
    }

    pub fn fail_listing(&self, error: GatewayError) {
        *self.listing_error.lock() = Some(error);
    }

    pub fn fail_for(&self, player_id: PlayerId, error: GatewayError) {
        self.failures.lock().insert(player_id, error);
    }

    pub fn heal(&self, player_id: PlayerId) {
        self.failures.lock().remove(&player_id);
    }

    /// Every successful update, in the order it arrived.
    pub fn updates(&self) -> Vec<(GuildId, PlayerId, VoiceState)> {
        self.updates.lock().clone()
    }

    /// Last state successfully applied to `player_id`.
    pub fn current(&self, player_id: PlayerId) -> Option<VoiceState> {
        self.updates
            .lock()
            .iter()
            .rev()
            .find(|(_, id, _)| *id == player_id)
            .map(|(_, _, state)| *state)
    }

    pub fn clear(&self) {
        self.updates.lock().clear();
    }
}

#[async_trait]
impl VoiceGateway for RecordingVoiceGateway {
    async fn set_voice_state(
        &self,
        guild_id: GuildId,
        player_id: PlayerId,
        state: VoiceState,
    ) -> Result<(), GatewayError> {
        if let Some(error) = self.failures.lock().get(&player_id) {
            return Err(error.clone());
        }
        self.updates.lock().push((guild_id, player_id, state));
        Ok(())
    }

    async fn channel_members(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Vec<PlayerId>, GatewayError> {
        if let Some(error) = self.listing_error.lock().clone() {
            return Err(error);
        }
        Ok(self
            .members
            .lock()
            .get(&channel_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Panel surface that keeps every published view.
#[derive(Debug, Default)]
pub struct RecordingPanelSurface {
    published: Mutex<Vec<(PanelLocation, PanelView)>>,
    failure: Mutex<Option<GatewayError>>,
    relocate_to: Mutex<Option<PanelLocation>>,
}

impl RecordingPanelSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every publish until `recover` is called.
    pub fn fail_with(&self, error: GatewayError) {
        *self.failure.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// The next publish reports that the panel moved to `location`.
    pub fn relocate_next(&self, location: PanelLocation) {
        *self.relocate_to.lock() = Some(location);
    }

    pub fn published(&self) -> Vec<(PanelLocation, PanelView)> {
        self.published.lock().clone()
    }

    pub fn last(&self) -> Option<(PanelLocation, PanelView)> {
        self.published.lock().last().cloned()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }
}

#[async_trait]
impl PanelSurface for RecordingPanelSurface {
    async fn publish(
        &self,
        location: PanelLocation,
        view: &PanelView,
    ) -> Result<Option<PanelLocation>, GatewayError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        self.published.lock().push((location, view.clone()));
        Ok(self.relocate_to.lock().take())
    }
}
