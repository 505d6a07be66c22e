use std::sync::Arc;

use crate::config::BotConfig;
use crate::domain::voice_policy::VoicePolicy;
use crate::error::AppError;
use crate::infra::db::connect_db;
use crate::services::coordinator::CoordinatorContext;
use crate::services::gateway::{PanelSurface, VoiceGateway};
use crate::state::app_state::AppState;

/// Builder for `AppState`, used by the bot process and by tests.
pub struct StateBuilder {
    config: BotConfig,
    policy: VoicePolicy,
    voice_gateway: Option<Arc<dyn VoiceGateway>>,
    panel_surface: Option<Arc<dyn PanelSurface>>,
}

impl StateBuilder {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            policy: VoicePolicy::default(),
            voice_gateway: None,
            panel_surface: None,
        }
    }

    pub fn with_policy(mut self, policy: VoicePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_voice_gateway(mut self, gateway: Arc<dyn VoiceGateway>) -> Self {
        self.voice_gateway = Some(gateway);
        self
    }

    pub fn with_panel_surface(mut self, surface: Arc<dyn PanelSurface>) -> Self {
        self.panel_surface = Some(surface);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let voice_gateway = self
            .voice_gateway
            .ok_or_else(|| AppError::config("no voice gateway configured"))?;
        let panel_surface = self
            .panel_surface
            .ok_or_else(|| AppError::config("no control panel surface configured"))?;

        // single entrypoint: connect + migrate
        let db = connect_db(self.config.runtime_env, self.config.db_kind).await?;
        let coordinators = CoordinatorContext::new(
            db,
            voice_gateway,
            panel_surface,
            self.policy,
            self.config.voice_fanout,
        );
        Ok(AppState::new(self.config, coordinators))
    }
}

pub fn build_state(config: BotConfig) -> StateBuilder {
    StateBuilder::new(config)
}
