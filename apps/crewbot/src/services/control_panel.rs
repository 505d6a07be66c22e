use std::sync::Arc;

use sea_orm::ConnectionTrait;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::games_sea::GameUpdate;
use crate::domain::ids::{ChannelId, PanelLocation};
use crate::domain::panel_view::PanelView;
use crate::error::AppError;
use crate::repos::games::{self, Game};
use crate::services::gateway::{GatewayError, PanelSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    Updated,
    /// The surface re-posted the panel; the new location has been saved.
    Relocated(PanelLocation),
}

#[derive(Debug, Error)]
pub enum PanelRefreshError {
    /// The panel could not be shown, e.g. its channel or message is gone.
    #[error("control panel not updated: {0}")]
    Gateway(#[from] GatewayError),
    #[error("control panel state unavailable: {0}")]
    Store(#[from] AppError),
}

pub struct ControlPanelProjector {
    surface: Arc<dyn PanelSurface>,
}

impl ControlPanelProjector {
    pub fn new(surface: Arc<dyn PanelSurface>) -> Self {
        Self { surface }
    }

    pub fn render(game: &Game) -> PanelView {
        PanelView::render(game.channel_id, game.state, &game.roster)
    }

    /// Re-read the channel's game, render it and push it to the surface.
    ///
    /// A relocation reported by the surface is persisted so the next refresh
    /// edits the new message.
    pub async fn refresh<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        channel_id: ChannelId,
    ) -> Result<PanelOutcome, PanelRefreshError> {
        let game = games::require_game(conn, channel_id)
            .await
            .map_err(AppError::from)?;
        let view = Self::render(&game);

        let relocated = self
            .surface
            .publish(game.panel, &view)
            .await
            .inspect_err(|e| {
                warn!(
                    channel_id = %channel_id,
                    panel = ?game.panel,
                    error = %e,
                    "panel publish failed"
                );
            })?;

        let Some(location) = relocated else {
            return Ok(PanelOutcome::Updated);
        };

        games::update(
            conn,
            GameUpdate::new(channel_id, game.lock_version).with_panel(location),
        )
        .await
        .map_err(AppError::from)?;

        info!(
            channel_id = %channel_id,
            panel_channel_id = %location.channel_id,
            panel_message_id = %location.message_id,
            "control panel relocated"
        );
        Ok(PanelOutcome::Relocated(location))
    }
}
