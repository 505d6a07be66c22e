//! Pure game rules: no database, no chat, no voice I/O.

pub mod ids;
pub mod lifecycle;
pub mod panel_view;
pub mod player_ids;
pub mod roster;
pub mod voice_policy;

pub use ids::{ChannelId, GuildId, MessageId, PanelLocation, PlayerId};
pub use lifecycle::{next_state, Operation, RoundPhase};
pub use panel_view::{PanelAction, PanelView};
pub use roster::{Role, Roster};
pub use voice_policy::{VoicePolicy, VoiceState};
