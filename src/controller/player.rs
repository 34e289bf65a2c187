use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::server::{GameString, PlayerInfo, Server};

/// Use to lookup information of connected players.
#[async_trait]
pub trait LivePlayers: Send + Sync {
    /// While holding this guard, the state is read-only, and can be referenced.
    async fn lock(&self) -> RwLockReadGuard<'_, PlayersState>;

    /// Return information about the player with the given login,
    /// or `None` if no such player is connected.
    async fn info(&self, login: &str) -> Option<PlayerInfo> {
        self.lock().await.info(login).cloned()
    }

    /// Return information for all connected players and spectators.
    async fn info_all(&self) -> Vec<PlayerInfo> {
        self.lock().await.info_all().into_iter().cloned().collect()
    }

    /// Return the nick name of the player with the specified login, or `None` if no
    /// player with that login is connected.
    async fn nick_name(&self, login: &str) -> Option<GameString> {
        self.lock()
            .await
            .info(login)
            .map(|info| info.nick_name.clone())
    }
}

/// Changes to the list of connected players.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerDiff {
    Add(PlayerInfo),
    Update(PlayerInfo),
    Remove(PlayerInfo),
}

pub struct PlayersState {
    /// Cached player info for connected players, by login.
    infos: HashMap<String, PlayerInfo>,
}

impl PlayersState {
    fn init() -> Self {
        PlayersState {
            infos: HashMap::new(),
        }
    }

    /// Return detailed information for the given login.
    pub fn info(&self, login: &str) -> Option<&PlayerInfo> {
        self.infos.get(login)
    }

    /// Return information for all connected players and spectators.
    pub fn info_all(&self) -> Vec<&PlayerInfo> {
        self.infos.values().collect()
    }

    /// Return information for all connected players that are not spectating.
    pub fn info_playing(&self) -> Vec<&PlayerInfo> {
        self.infos.values().filter(|info| !info.spectator).collect()
    }

    /// `true` if the player is connected, and not spectating.
    pub fn is_playing(&self, login: &str) -> bool {
        self.infos.get(login).map_or(false, |info| !info.spectator)
    }
}

#[derive(Clone)]
pub struct PlayerController {
    state: Arc<RwLock<PlayersState>>,
}

impl PlayerController {
    /// Seed the cache with the players that are connected right now.
    pub async fn init(server: &Arc<dyn Server>) -> Self {
        let mut state = PlayersState::init();
        for info in server.players().await {
            state.infos.insert(info.login.clone(), info);
        }
        PlayerController {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Update a player's information. Returns `None` if nothing changed.
    pub async fn update_player(&self, info: PlayerInfo) -> Option<PlayerDiff> {
        let mut state = self.state.write().await;
        match state.infos.insert(info.login.clone(), info.clone()) {
            None => Some(PlayerDiff::Add(info)),
            Some(prev) if prev != info => Some(PlayerDiff::Update(info)),
            Some(_) => None,
        }
    }

    /// Remove a player's information.
    pub async fn remove_player(&self, login: &str) -> Option<PlayerDiff> {
        let mut state = self.state.write().await;
        state.infos.remove(login).map(PlayerDiff::Remove)
    }
}

#[async_trait]
impl LivePlayers for PlayerController {
    async fn lock(&self) -> RwLockReadGuard<'_, PlayersState> {
        self.state.read().await
    }
}
