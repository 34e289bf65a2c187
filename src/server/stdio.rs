use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::server::{PlayerInfo, Result, Server, ServerEvent};

/// A host connection that reads events as JSON lines from stdin, and writes
/// calls as JSON lines to stdout.
///
/// This lets a bridge process relay a live game server, and it lets recorded
/// event streams be replayed against the controller.
pub struct StdioConnection {
    pub server: Arc<StdioServer>,
    pub events: mpsc::Receiver<ServerEvent>,
    pub reader_handle: JoinHandle<()>,
}

/// Outgoing calls, serialized f.e. as
/// `{"call":"ChatSendServerMessage","message":"..."}`
#[derive(Serialize, Debug)]
#[serde(tag = "call")]
enum ServerCall<'a> {
    ChatSendServerMessage {
        message: &'a str,
    },
    ChatSendServerMessageToLogin {
        message: &'a str,
        logins: Vec<&'a str>,
    },
    SendDisplayManialinkPageToLogin {
        login: &'a str,
        xml: &'a str,
    },
    ForceSpectatorTarget {
        spectator: &'a str,
        target: &'a str,
    },
}

pub struct StdioServer {
    stdout: Mutex<Stdout>,

    /// Players that connected according to the event stream, since the
    /// host cannot be queried.
    players: RwLock<HashMap<String, PlayerInfo>>,
}

impl StdioConnection {
    pub fn open() -> Self {
        const CHANNEL_CAPACITY: usize = 256;

        let server = Arc::new(StdioServer {
            stdout: Mutex::new(tokio::io::stdout()),
            players: RwLock::new(HashMap::new()),
        });
        let (sender, events) = mpsc::channel(CHANNEL_CAPACITY);

        let reader_server = server.clone();
        let reader_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        log::error!("failed to read host event: {}", err);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match serde_json::from_str::<ServerEvent>(&line) {
                    Ok(event) => event,
                    Err(err) => {
                        log::warn!("ignoring malformed host event '{}': {}", line, err);
                        continue;
                    }
                };
                reader_server.track(&event).await;
                if sender.send(event).await.is_err() {
                    break; // receiver dropped
                }
            }
            log::info!("host event stream closed");
        });

        StdioConnection {
            server,
            events,
            reader_handle,
        }
    }
}

impl StdioServer {
    async fn track(&self, event: &ServerEvent) {
        if let Some(info) = event.player_info() {
            let mut players = self.players.write().await;
            players.insert(info.login.clone(), info);
        } else if let ServerEvent::PlayerDisconnect { login } = event {
            let mut players = self.players.write().await;
            players.remove(login);
        }
    }

    async fn call(&self, call: ServerCall<'_>) -> Result<()> {
        let mut line = serde_json::to_string(&call)?;
        line.push('\n');
        let mut stdout = self.stdout.lock().await;
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Server for StdioServer {
    async fn players(&self) -> Vec<PlayerInfo> {
        self.players.read().await.values().cloned().collect()
    }

    async fn chat_send(&self, msg: &str) -> Result<()> {
        self.call(ServerCall::ChatSendServerMessage { message: msg })
            .await
    }

    async fn chat_send_to(&self, msg: &str, logins: Vec<&str>) -> Result<()> {
        self.call(ServerCall::ChatSendServerMessageToLogin {
            message: msg,
            logins,
        })
        .await
    }

    async fn send_manialink_to(&self, xml: &str, login: &str) -> Result<()> {
        self.call(ServerCall::SendDisplayManialinkPageToLogin { login, xml })
            .await
    }

    async fn force_spectator_target(
        &self,
        spectator_login: &str,
        target_login: &str,
    ) -> Result<()> {
        self.call(ServerCall::ForceSpectatorTarget {
            spectator: spectator_login,
            target: target_login,
        })
        .await
    }
}
