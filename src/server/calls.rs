use async_trait::async_trait;
use thiserror::Error;

use crate::server::PlayerInfo;

pub type Result<T> = std::result::Result<T, Fault>;

/// A failed call on the host.
#[derive(Error, Debug)]
#[error("host call failed: {msg}")]
pub struct Fault {
    pub msg: String,
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        Fault {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Fault {
    fn from(err: serde_json::Error) -> Self {
        Fault {
            msg: err.to_string(),
        }
    }
}

/// Calls on the host game server.
///
/// Any fault is most likely due to a player disconnecting,
/// or the connection to the host going away. Neither should
/// affect the state of a knockout match.
#[async_trait]
pub trait Server: Send + Sync {
    /// All connected players and spectators.
    async fn players(&self) -> Vec<PlayerInfo>;

    /// Send a chat message to all players.
    async fn chat_send(&self, msg: &str) -> Result<()>;

    /// Send a chat message to the specified players only.
    async fn chat_send_to(&self, msg: &str, logins: Vec<&str>) -> Result<()>;

    /// Display a manialink for the specified player. An empty manialink with the
    /// same ID replaces, and thereby removes a previously sent one.
    async fn send_manialink_to(&self, xml: &str, login: &str) -> Result<()>;

    /// Make the spectator follow the specified player.
    async fn force_spectator_target(&self, spectator_login: &str, target_login: &str)
        -> Result<()>;
}
