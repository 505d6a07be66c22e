//! In-memory stand-ins for the chat platform, plus a helper that wires them to
//! a migrated in-memory database. Used by the integration suites.

pub mod fakes;

use std::sync::Arc;

use db_infra::config::db::{DbKind, RuntimeEnv};

pub use fakes::{RecordingPanelSurface, RecordingVoiceGateway};

use crate::config::BotConfig;
use crate::error::AppError;
use crate::infra::state::build_state;
use crate::state::app_state::AppState;

/// App state on a fresh `sqlite::memory:` database with the given fakes.
pub async fn memory_state(
    voice: Arc<RecordingVoiceGateway>,
    panel: Arc<RecordingPanelSurface>,
) -> Result<AppState, AppError> {
    state_with(
        BotConfig::new(RuntimeEnv::Test, DbKind::SqliteMemory),
        voice,
        panel,
    )
    .await
}

/// App state for `config` (connected and migrated) with the given fakes.
pub async fn state_with(
    config: BotConfig,
    voice: Arc<RecordingVoiceGateway>,
    panel: Arc<RecordingPanelSurface>,
) -> Result<AppState, AppError> {
    build_state(config)
        .with_voice_gateway(voice)
        .with_panel_surface(panel)
        .build()
        .await
}
