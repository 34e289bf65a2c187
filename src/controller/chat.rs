use std::sync::Arc;

use crate::chat::{KnockoutCommand, PlayerMessage, ServerMessage};
use crate::config::Config;
use crate::server::Server;

/// This controller filters chat commands, and sends chat messages.
#[derive(Clone)]
pub struct ChatController {
    server: Arc<dyn Server>,
    config: Arc<Config>,
}

impl ChatController {
    pub fn init(server: &Arc<dyn Server>, config: &Arc<Config>) -> Self {
        ChatController {
            server: server.clone(),
            config: config.clone(),
        }
    }

    /// Return the command in a chat message, if there is one, and the sender
    /// is allowed to use it. Everything else is left for the host to handle.
    pub fn forward<'a>(&self, message: &'a str, from_login: &str) -> Option<KnockoutCommand<'a>> {
        let cmd = KnockoutCommand::parse(message)?;
        if !self.config.is_admin(from_login) {
            log::debug!("ignoring command of non-admin {}: {}", from_login, message);
            return None;
        }
        Some(cmd)
    }

    /// Send a message to the specified player.
    pub async fn tell(&self, message: PlayerMessage<'_>, to_login: &str) {
        let message_str = message.to_string();
        if message_str.is_empty() {
            return;
        }
        log::debug!("player msg @{}> {}", to_login, &message_str);

        // Assume any fault is due to the target player disconnecting.
        let _ = self.server.chat_send_to(&message_str, vec![to_login]).await;
    }

    /// Send a message to all players.
    pub async fn announce(&self, message: ServerMessage<'_>) {
        let message_str = message.to_string();
        log::debug!("server msg> {}", &message_str);
        if let Err(fault) = self.server.chat_send(&message_str).await {
            log::error!("failed to send chat message: {}", fault);
        }
    }
}
