pub mod channel_locks;
pub mod control_panel;
pub mod coordinator;
pub mod gateway;
pub mod voice;

pub use channel_locks::ChannelLocks;
pub use control_panel::{ControlPanelProjector, PanelOutcome, PanelRefreshError};
pub use coordinator::{CoordinatorContext, GameCoordinator, TransitionReport, VoiceEffect};
pub use gateway::{GatewayError, PanelSurface, VoiceGateway};
pub use voice::{ReconcileOutcome, ReconcileReport, VoiceReconciler};
