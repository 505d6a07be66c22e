//! Game coordinator: the only writer of a channel's game record.
//!
//! Every operation holds the channel's lock from start to finish, reloads the
//! record inside a transaction, checks it against the lifecycle table, writes
//! it guarded by `lock_version` and commits. Voice and panel side effects run
//! after the commit against a fresh read and are reported, never rolled back.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use crate::adapters::games_sea::GameUpdate;
use crate::db::txn::with_txn;
use crate::domain::ids::{ChannelId, GuildId, PanelLocation, PlayerId};
use crate::domain::lifecycle::{next_state, Operation};
use crate::domain::roster::Roster;
use crate::domain::voice_policy::VoicePolicy;
use crate::entities::games::GameState;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::games::{self, Game};
use crate::services::channel_locks::ChannelLocks;
use crate::services::control_panel::{ControlPanelProjector, PanelOutcome, PanelRefreshError};
use crate::services::gateway::{PanelSurface, VoiceGateway};
use crate::services::voice::{ReconcileOutcome, ReconcileReport, VoiceReconciler};

/// Everything a coordinator needs, built once at startup.
#[derive(Clone)]
pub struct CoordinatorContext {
    pub db: DatabaseConnection,
    pub voice_gateway: Arc<dyn VoiceGateway>,
    pub reconciler: Arc<VoiceReconciler>,
    pub projector: Arc<ControlPanelProjector>,
    pub locks: ChannelLocks,
}

impl CoordinatorContext {
    pub fn new(
        db: DatabaseConnection,
        voice_gateway: Arc<dyn VoiceGateway>,
        panel_surface: Arc<dyn PanelSurface>,
        policy: VoicePolicy,
        voice_fanout: usize,
    ) -> Self {
        let reconciler = VoiceReconciler::new(voice_gateway.clone(), policy, voice_fanout);
        Self {
            db,
            voice_gateway,
            reconciler: Arc::new(reconciler),
            projector: Arc::new(ControlPanelProjector::new(panel_surface)),
            locks: ChannelLocks::new(),
        }
    }
}

#[derive(Debug)]
pub enum VoiceEffect {
    /// The operation does not touch voice.
    Skipped,
    All(ReconcileReport),
    One {
        player_id: PlayerId,
        outcome: ReconcileOutcome,
    },
}

impl VoiceEffect {
    pub fn is_clean(&self) -> bool {
        match self {
            VoiceEffect::Skipped => true,
            VoiceEffect::All(report) => report.is_clean(),
            VoiceEffect::One { outcome, .. } => !outcome.is_failure(),
        }
    }
}

/// Outcome of one coordinator operation whose record write succeeded.
#[derive(Debug)]
pub struct TransitionReport {
    pub operation: Operation,
    /// Game as read after the write; `None` once the game has been ended and
    /// deleted.
    pub game: Option<Game>,
    pub voice: VoiceEffect,
    /// `None` when the operation did not need a panel refresh.
    pub panel: Option<Result<PanelOutcome, PanelRefreshError>>,
}

impl TransitionReport {
    pub fn side_effects_ok(&self) -> bool {
        self.voice.is_clean() && !matches!(self.panel, Some(Err(_)))
    }

    /// One line per failed side effect, for the chat layer to show.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        match &self.voice {
            VoiceEffect::All(report) => {
                for failure in &report.failures {
                    problems.push(format!(
                        "could not update voice for {}: {}",
                        failure.player_id.mention(),
                        failure.error
                    ));
                }
            }
            VoiceEffect::One {
                player_id,
                outcome: ReconcileOutcome::Failed(error),
            } => problems.push(format!(
                "could not update voice for {}: {error}",
                player_id.mention()
            )),
            VoiceEffect::One { .. } | VoiceEffect::Skipped => {}
        }
        if let Some(Err(e)) = &self.panel {
            problems.push(e.to_string());
        }
        problems
    }
}

/// Working copy an operation edits inside its transaction.
#[derive(Debug)]
struct Draft {
    roster: Roster,
    panel: PanelLocation,
}

pub struct GameCoordinator {
    ctx: CoordinatorContext,
    game: Game,
}

impl GameCoordinator {
    /// Coordinator for the game in `channel_id`, or `None` when there is none.
    pub async fn for_channel(
        ctx: &CoordinatorContext,
        channel_id: ChannelId,
    ) -> Result<Option<Self>, AppError> {
        let game = games::find_by_channel(&ctx.db, channel_id).await?;
        Ok(game.map(|game| Self {
            ctx: ctx.clone(),
            game,
        }))
    }

    /// Start tracking a new game. Everyone currently in the voice channel is
    /// seeded as a spectator. Fails with `GameExists` when the channel already
    /// has a game; a leftover `ended` record is cleared instead.
    pub async fn create_game(
        ctx: &CoordinatorContext,
        channel_id: ChannelId,
        guild_id: GuildId,
        panel: PanelLocation,
    ) -> Result<Self, AppError> {
        let _guard = ctx.locks.acquire(channel_id).await;
        let spectators = match ctx.voice_gateway.channel_members(guild_id, channel_id).await {
            Ok(members) => members,
            Err(error) => {
                // Newcomers are still picked up through player_joined.
                warn!(channel_id = %channel_id, error = %error, "could not list voice members");
                Vec::new()
            }
        };

        let game = with_txn(&ctx.db, move |txn| {
            Box::pin(async move {
                match games::find_by_channel(txn, channel_id).await? {
                    Some(existing) if existing.state == GameState::Ended => {
                        warn!(channel_id = %channel_id, "clearing leftover ended game");
                        games::destroy(txn, channel_id).await?;
                    }
                    Some(_) => {
                        return Err(DomainError::conflict(
                            ConflictKind::GameExists,
                            format!("A game already exists for channel {channel_id}"),
                        )
                        .into());
                    }
                    None => {}
                }
                let spectators = spectators.into_iter().collect();
                Ok(games::create(txn, channel_id, guild_id, panel, spectators).await?)
            })
        })
        .await?;

        info!(
            channel_id = %channel_id,
            guild_id = %guild_id,
            spectators = game.roster.len(),
            "game created"
        );
        Ok(Self {
            ctx: ctx.clone(),
            game,
        })
    }

    pub fn channel_id(&self) -> ChannelId {
        self.game.channel_id
    }

    /// Game as of this coordinator's last read or write. Not to be used for
    /// decisions; every operation reloads.
    pub fn snapshot(&self) -> &Game {
        &self.game
    }

    /// Alive players right now, sorted by id.
    pub async fn alive_players(&mut self) -> Result<Vec<PlayerId>, AppError> {
        self.game = games::reload(&self.ctx.db, &self.game).await?;
        Ok(self.game.roster.alive())
    }

    /// `created -> playing`; every tracked player becomes alive.
    pub async fn start_game(&mut self) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::StartGame, |draft| {
            draft.roster.start_round();
            Ok(())
        })
        .await?;
        Ok(self.after_round_change(Operation::StartGame).await)
    }

    pub async fn start_meeting(&mut self) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::StartMeeting, |_| Ok(())).await?;
        Ok(self.after_round_change(Operation::StartMeeting).await)
    }

    pub async fn end_meeting(&mut self) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::EndMeeting, |_| Ok(())).await?;
        Ok(self.after_round_change(Operation::EndMeeting).await)
    }

    /// Move an alive player to the dead roster. Anyone else is rejected.
    pub async fn player_died(&mut self, player_id: PlayerId) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::PlayerDied, move |draft| {
            draft.roster.mark_dead(player_id)?;
            Ok(())
        })
        .await?;

        let game = self.fresh().await;
        let outcome = self.ctx.reconciler.reconcile_one(&game, player_id).await;
        let panel = self.project_panel().await;
        Ok(self.report(
            Operation::PlayerDied,
            VoiceEffect::One { player_id, outcome },
            Some(panel),
        ))
    }

    /// A member entered the game's voice channel. Newcomers spectate; a
    /// returning player keeps their role and just gets their voice state back.
    pub async fn player_joined(
        &mut self,
        player_id: PlayerId,
    ) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        let added = self
            .persist(Operation::PlayerJoined, move |draft| {
                draft.roster.add_spectator(player_id);
                Ok(())
            })
            .await?;

        let game = self.fresh().await;
        let outcome = self.ctx.reconciler.reconcile_one(&game, player_id).await;
        let panel = if added {
            Some(self.project_panel().await)
        } else {
            None
        };
        Ok(self.report(
            Operation::PlayerJoined,
            VoiceEffect::One { player_id, outcome },
            panel,
        ))
    }

    /// A member left voice. They stay on their roster; only their voice
    /// restrictions are lifted while away.
    pub async fn player_left(&mut self, player_id: PlayerId) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::PlayerLeft, |_| Ok(())).await?;
        let outcome = if self.game.roster.contains(player_id) {
            self.ctx
                .reconciler
                .release(self.game.guild_id, player_id)
                .await
        } else {
            ReconcileOutcome::Untracked
        };
        Ok(self.report(
            Operation::PlayerLeft,
            VoiceEffect::One { player_id, outcome },
            None,
        ))
    }

    /// Point the game at a new control panel message and render it there.
    pub async fn relocate_panel(
        &mut self,
        location: PanelLocation,
    ) -> Result<TransitionReport, AppError> {
        let _guard = self.lock().await;
        self.persist(Operation::RelocatePanel, move |draft| {
            draft.panel = location;
            Ok(())
        })
        .await?;

        let panel = self.project_panel().await;
        self.fresh().await;
        Ok(self.report(Operation::RelocatePanel, VoiceEffect::Skipped, Some(panel)))
    }

    /// Re-render the control panel from the stored record.
    pub async fn refresh_panel(&self) -> Result<PanelOutcome, PanelRefreshError> {
        let _guard = self.lock().await;
        self.project_panel().await
    }

    /// End the game: mark it ended, release everyone's voice, show the final
    /// panel, then delete the record. Consumes the coordinator.
    ///
    /// Also finishes a game left in `ended` by an interrupted earlier call.
    pub async fn end_game(mut self) -> Result<TransitionReport, AppError> {
        let guard = self.lock().await;
        self.persist(Operation::EndGame, |_| Ok(())).await?;
        let game = self.fresh().await;

        let voice = self.ctx.reconciler.reconcile_all(&game).await;
        let panel = self.project_panel().await;

        games::destroy(&self.ctx.db, game.channel_id).await?;
        drop(guard);
        self.ctx.locks.prune(game.channel_id);
        info!(channel_id = %game.channel_id, "game ended");

        let report = TransitionReport {
            operation: Operation::EndGame,
            game: None,
            voice: VoiceEffect::All(voice),
            panel: Some(panel),
        };
        if !report.side_effects_ok() {
            warn!(
                channel_id = %game.channel_id,
                problems = ?report.problems(),
                "side effects incomplete"
            );
        }
        Ok(report)
    }

    /// Reload, validate `operation` against the current state, apply `edit`
    /// and write the result, all in one transaction.
    ///
    /// Returns whether anything was written; when neither the state nor the
    /// draft changes the record is left alone.
    async fn persist<E>(&mut self, operation: Operation, edit: E) -> Result<bool, AppError>
    where
        E: FnOnce(&mut Draft) -> Result<(), DomainError> + Send + 'static,
    {
        let channel_id = self.game.channel_id;
        let (game, written) = with_txn(&self.ctx.db, move |txn| {
            Box::pin(async move {
                let game = load_for_write(txn, channel_id, operation).await?;
                let next = next_state(game.state, operation)?;

                let mut draft = Draft {
                    roster: game.roster.clone(),
                    panel: game.panel,
                };
                edit(&mut draft)?;

                let mut update = GameUpdate::new(channel_id, game.lock_version);
                let mut dirty = false;
                if next != game.state {
                    update = update.with_state(next);
                    dirty = true;
                }
                if draft.roster != game.roster {
                    update = update.with_rosters(draft.roster.to_sets());
                    dirty = true;
                }
                if draft.panel != game.panel {
                    update = update.with_panel(draft.panel);
                    dirty = true;
                }
                if !dirty {
                    return Ok((game, false));
                }

                let updated = games::update(txn, update).await?;
                info!(
                    channel_id = %channel_id,
                    operation = %operation,
                    from = %game.state,
                    state = %updated.state,
                    lock_version = updated.lock_version,
                    "game updated"
                );
                Ok((updated, true))
            })
        })
        .await?;

        self.game = game;
        Ok(written)
    }

    async fn lock(&self) -> OwnedMutexGuard<()> {
        self.ctx.locks.acquire(self.game.channel_id).await
    }

    /// Panel refresh for callers already holding the channel lock.
    async fn project_panel(&self) -> Result<PanelOutcome, PanelRefreshError> {
        self.ctx
            .projector
            .refresh(&self.ctx.db, self.game.channel_id)
            .await
    }

    async fn after_round_change(&mut self, operation: Operation) -> TransitionReport {
        let game = self.fresh().await;
        let voice = self.ctx.reconciler.reconcile_all(&game).await;
        let panel = self.project_panel().await;
        self.report(operation, VoiceEffect::All(voice), Some(panel))
    }

    /// Re-read the record ahead of a side effect. Keeps the last committed copy
    /// when the read fails.
    async fn fresh(&mut self) -> Game {
        match games::find_by_channel(&self.ctx.db, self.game.channel_id).await {
            Ok(Some(game)) => self.game = game,
            // Deleted by a concurrent end_game: nothing is restricted any more.
            Ok(None) => self.game.state = GameState::Ended,
            Err(e) => {
                warn!(channel_id = %self.game.channel_id, error = %e, "reload after write failed");
            }
        }
        self.game.clone()
    }

    fn report(
        &self,
        operation: Operation,
        voice: VoiceEffect,
        panel: Option<Result<PanelOutcome, PanelRefreshError>>,
    ) -> TransitionReport {
        let report = TransitionReport {
            operation,
            game: Some(self.game.clone()),
            voice,
            panel,
        };
        if !report.side_effects_ok() {
            warn!(
                channel_id = %self.game.channel_id,
                operation = %operation,
                problems = ?report.problems(),
                "side effects incomplete"
            );
        }
        report
    }
}

/// A game that is already gone has been ended, so writing to it is an invalid
/// transition rather than a lookup miss.
async fn load_for_write<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    channel_id: ChannelId,
    operation: Operation,
) -> Result<Game, AppError> {
    games::find_by_channel(conn, channel_id).await?.ok_or_else(|| {
        DomainError::InvalidTransition {
            from: GameState::Ended,
            operation,
        }
        .into()
    })
}
