//! Voice state reconciliation: push the policy's verdict for every tracked
//! player (or a single one) to the voice gateway.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::domain::ids::{GuildId, PlayerId};
use crate::domain::voice_policy::{VoicePolicy, VoiceState};
use crate::repos::games::Game;
use crate::services::gateway::{GatewayError, VoiceGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied(VoiceState),
    /// The player holds no role in this game; nothing was sent.
    Untracked,
    Failed(GatewayError),
}

impl ReconcileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ReconcileOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceUpdateFailure {
    pub player_id: PlayerId,
    pub error: GatewayError,
}

/// Result of a full reconciliation. Each player's update is independent, so
/// one failure never hides the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Sorted by player id.
    pub applied: Vec<(PlayerId, VoiceState)>,
    /// Sorted by player id.
    pub failures: Vec<VoiceUpdateFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_players(&self) -> Vec<PlayerId> {
        self.failures.iter().map(|f| f.player_id).collect()
    }
}

pub struct VoiceReconciler {
    gateway: Arc<dyn VoiceGateway>,
    policy: VoicePolicy,
    fanout: usize,
}

impl VoiceReconciler {
    /// `fanout` bounds the number of voice updates in flight at once.
    pub fn new(gateway: Arc<dyn VoiceGateway>, policy: VoicePolicy, fanout: usize) -> Self {
        Self {
            gateway,
            policy,
            fanout: fanout.max(1),
        }
    }

    /// Bring every tracked player in line with `game`. Outside an active round
    /// everyone is released.
    pub async fn reconcile_all(&self, game: &Game) -> ReconcileReport {
        let guild_id = game.guild_id;
        let targets: Vec<(PlayerId, VoiceState)> = game
            .roster
            .players()
            .map(|(player_id, role)| (player_id, self.policy.resolve(role, game.state)))
            .collect();

        debug!(
            channel_id = %game.channel_id,
            state = %game.state,
            players = targets.len(),
            "reconciling voice"
        );

        let results: Vec<(PlayerId, VoiceState, Result<(), GatewayError>)> = stream::iter(targets)
            .map(|(player_id, state)| async move {
                let result = self.gateway.set_voice_state(guild_id, player_id, state).await;
                (player_id, state, result)
            })
            .buffer_unordered(self.fanout)
            .collect()
            .await;

        let mut report = ReconcileReport::default();
        for (player_id, state, result) in results {
            match result {
                Ok(()) => report.applied.push((player_id, state)),
                Err(error) => {
                    warn!(
                        channel_id = %game.channel_id,
                        player_id = %player_id,
                        error = %error,
                        "voice update failed"
                    );
                    report.failures.push(VoiceUpdateFailure { player_id, error });
                }
            }
        }
        report.applied.sort_by_key(|(player_id, _)| *player_id);
        report.failures.sort_by_key(|f| f.player_id);
        report
    }

    /// Apply the policy to one player. Untracked players are left alone.
    pub async fn reconcile_one(&self, game: &Game, player_id: PlayerId) -> ReconcileOutcome {
        let Some(role) = game.roster.role_of(player_id) else {
            debug!(channel_id = %game.channel_id, player_id = %player_id, "player untracked");
            return ReconcileOutcome::Untracked;
        };

        let state = self.policy.resolve(role, game.state);
        self.apply(game.guild_id, player_id, state).await
    }

    /// Lift every restriction from one player, whatever the game says.
    pub async fn release(&self, guild_id: GuildId, player_id: PlayerId) -> ReconcileOutcome {
        self.apply(guild_id, player_id, VoiceState::UNRESTRICTED).await
    }

    async fn apply(
        &self,
        guild_id: GuildId,
        player_id: PlayerId,
        state: VoiceState,
    ) -> ReconcileOutcome {
        match self.gateway.set_voice_state(guild_id, player_id, state).await {
            Ok(()) => ReconcileOutcome::Applied(state),
            Err(error) => {
                warn!(player_id = %player_id, error = %error, "voice update failed");
                ReconcileOutcome::Failed(error)
            }
        }
    }
}
