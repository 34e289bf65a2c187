use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::server::{GameString, MapInfo, PlayerInfo};

/// Events delivered by the host game server, one at a time.
///
/// Each variant can be parsed from a JSON object, f.e.
/// `{ "event": "PlayerFinish", "login": "aru", "time_millis": 48051 }`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum ServerEvent {
    /// A player connected to the server.
    PlayerConnect {
        login: String,
        nick_name: GameString,
        #[serde(default)]
        spectator: bool,
    },

    /// A player changed their nick name, or moved between playing and spectating.
    PlayerInfoChanged {
        login: String,
        nick_name: GameString,
        #[serde(default)]
        spectator: bool,
    },

    /// A player disconnected from the server.
    PlayerDisconnect { login: String },

    /// A new map was loaded and its race begins.
    BeginRace {
        #[serde(default)]
        map: Option<MapInfo>,
    },

    /// A player crossed the finish line. Non-positive times signal
    /// a run that was not completed, and are ignored.
    PlayerFinish {
        login: String,
        time_millis: i64,

        /// When the run was completed. Defaults to the time at which
        /// the event was received.
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },

    /// The race on the current map is over. This is the only point
    /// at which players are eliminated.
    EndRace,

    /// A player's client (re)displays manialinks, f.e. after loading a map.
    PlayerShowWidgets { login: String },

    /// A player clicked on a widget element with an action.
    PlayerAnswer { login: String, answer: String },

    /// A player sent a chat message.
    PlayerChat { login: String, message: String },
}

impl ServerEvent {
    pub fn player_info(&self) -> Option<PlayerInfo> {
        match self {
            ServerEvent::PlayerConnect {
                login,
                nick_name,
                spectator,
            }
            | ServerEvent::PlayerInfoChanged {
                login,
                nick_name,
                spectator,
            } => Some(PlayerInfo {
                login: login.clone(),
                nick_name: nick_name.clone(),
                spectator: *spectator,
            }),
            _ => None,
        }
    }
}
