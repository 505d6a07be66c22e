//! Strongly typed Discord snowflakes.
//!
//! Every id the bot handles is a 64-bit snowflake. Wrapping them keeps a voice
//! channel id from being passed where a player id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_snowflake(s).map($name)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }
    };
}

snowflake!(
    /// Voice channel hosting a game; also the game's identity.
    ChannelId
);
snowflake!(
    /// Guild (server) the voice channel belongs to.
    GuildId
);
snowflake!(
    /// Message carrying the rendered control panel.
    MessageId
);
snowflake!(
    /// Guild member taking part in (or watching) a game.
    PlayerId
);

impl ChannelId {
    /// `<#id>` mention.
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

impl PlayerId {
    /// `<@id>` mention.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Raised when a stored or supplied id is not a decimal snowflake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    pub input: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid snowflake id", self.input)
    }
}

impl std::error::Error for ParseIdError {}

fn parse_snowflake(s: &str) -> Result<u64, ParseIdError> {
    // `u64::from_str` accepts a leading '+', snowflakes never carry one.
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseIdError {
            input: s.to_string(),
        });
    }
    s.parse::<u64>().map_err(|_| ParseIdError {
        input: s.to_string(),
    })
}

/// Where the control panel is rendered: a text channel and a message in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelLocation {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

impl PanelLocation {
    pub fn new(channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}
