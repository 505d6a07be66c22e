//! What the control panel shows for a game: a title, the three rosters and
//! the buttons valid in the current state. Purely informational; turning a
//! `PanelView` into chat components is the surface's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{ChannelId, PlayerId};
use crate::domain::lifecycle::{is_allowed, Operation};
use crate::domain::roster::{Role, Roster};
use crate::entities::games::GameState;

pub const EMPTY_LIST: &str = "Nobody";
pub const ENDED_TITLE: &str = "Game Ended";
pub const ENDED_DESCRIPTION: &str =
    "This game of Among Us has ended. Use `/newgame` to create a new one!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelAction {
    GameStarted,
    MeetingStarted,
    MeetingEnded,
    PlayerDied,
    GameEnded,
}

impl PanelAction {
    /// Round controls, shown on the first row.
    const ROUND_ROW: [PanelAction; 3] = [
        PanelAction::MeetingStarted,
        PanelAction::MeetingEnded,
        PanelAction::PlayerDied,
    ];
    /// Start/end controls, shown on the second row.
    const LIFECYCLE_ROW: [PanelAction; 2] = [PanelAction::GameStarted, PanelAction::GameEnded];

    pub const fn label(self) -> &'static str {
        match self {
            PanelAction::GameStarted => "Game Started",
            PanelAction::MeetingStarted => "Meeting Started",
            PanelAction::MeetingEnded => "Meeting Ended",
            PanelAction::PlayerDied => "Player Died",
            PanelAction::GameEnded => "Game Ended",
        }
    }

    pub const fn style(self) -> ButtonStyle {
        match self {
            PanelAction::GameStarted => ButtonStyle::Success,
            PanelAction::MeetingStarted | PanelAction::MeetingEnded => ButtonStyle::Primary,
            PanelAction::PlayerDied | PanelAction::GameEnded => ButtonStyle::Danger,
        }
    }

    /// The coordinator operation a press of this button asks for.
    pub const fn operation(self) -> Operation {
        match self {
            PanelAction::GameStarted => Operation::StartGame,
            PanelAction::MeetingStarted => Operation::StartMeeting,
            PanelAction::MeetingEnded => Operation::EndMeeting,
            PanelAction::PlayerDied => Operation::PlayerDied,
            PanelAction::GameEnded => Operation::EndGame,
        }
    }

    const fn wire_name(self) -> &'static str {
        match self {
            PanelAction::GameStarted => "gameStarted",
            PanelAction::MeetingStarted => "meetingStart",
            PanelAction::MeetingEnded => "meetingEnd",
            PanelAction::PlayerDied => "playerDied",
            PanelAction::GameEnded => "gameEnded",
        }
    }

    fn from_wire_name(name: &str) -> Option<Self> {
        [
            PanelAction::GameStarted,
            PanelAction::MeetingStarted,
            PanelAction::MeetingEnded,
            PanelAction::PlayerDied,
            PanelAction::GameEnded,
        ]
        .into_iter()
        .find(|action| action.wire_name() == name)
    }

    /// `"<action>:<channel id>"`, carried back by the chat layer on a press.
    pub fn routing_id(self, channel_id: ChannelId) -> String {
        format!("{}:{}", self.wire_name(), channel_id)
    }

    /// Inverse of [`PanelAction::routing_id`]. `None` for ids that belong to
    /// some other component.
    pub fn parse_routing_id(raw: &str) -> Option<(PanelAction, ChannelId)> {
        let (name, channel) = raw.split_once(':')?;
        Some((Self::from_wire_name(name)?, channel.parse().ok()?))
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelButton {
    pub action: PanelAction,
    pub label: &'static str,
    pub style: ButtonStyle,
    pub routing_id: String,
}

impl PanelButton {
    fn new(action: PanelAction, channel_id: ChannelId) -> Self {
        Self {
            action,
            label: action.label(),
            style: action.style(),
            routing_id: action.routing_id(channel_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerList {
    pub label: &'static str,
    pub players: Vec<PlayerId>,
}

impl PlayerList {
    /// Mentions one per line in ascending id order, or the placeholder.
    pub fn body(&self) -> String {
        if self.players.is_empty() {
            return EMPTY_LIST.to_string();
        }
        self.players
            .iter()
            .map(|id| id.mention())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub title: String,
    pub description: Option<String>,
    pub lists: Vec<PlayerList>,
    /// Button rows; empty rows are left out.
    pub rows: Vec<Vec<PanelButton>>,
}

impl PanelView {
    pub fn render(channel_id: ChannelId, state: GameState, roster: &Roster) -> Self {
        if state == GameState::Ended {
            return Self {
                title: ENDED_TITLE.to_string(),
                description: Some(ENDED_DESCRIPTION.to_string()),
                lists: Vec::new(),
                rows: Vec::new(),
            };
        }

        let lists = [
            ("Alive", Role::Alive),
            ("Dead", Role::Dead),
            ("Spectating", Role::Spectator),
        ]
        .into_iter()
        .map(|(label, role)| PlayerList {
            label,
            players: roster.with_role(role),
        })
        .collect();

        let row = |actions: &[PanelAction]| -> Vec<PanelButton> {
            actions
                .iter()
                .filter(|action| is_allowed(state, action.operation()))
                .map(|action| PanelButton::new(*action, channel_id))
                .collect()
        };

        let rows = [row(&PanelAction::ROUND_ROW), row(&PanelAction::LIFECYCLE_ROW)]
            .into_iter()
            .filter(|buttons| !buttons.is_empty())
            .collect();

        Self {
            title: format!("Among Us in {}", channel_id.mention()),
            description: None,
            lists,
            rows,
        }
    }

    /// Actions on the panel, row by row.
    pub fn actions(&self) -> Vec<PanelAction> {
        self.rows.iter().flatten().map(|button| button.action).collect()
    }
}
