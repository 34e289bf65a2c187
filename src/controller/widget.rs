use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::controller::{LiveKnockout, LivePlayers};
use crate::server::Server;
use crate::widget::{KnockoutWidget, Widget};

/// Reasons to reject a request to spectate a player in the widget.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpectateError {
    #[error("player '{0}' is not connected")]
    NotConnected(String),

    #[error("player '{0}' is not spectating")]
    NotSpectating(String),

    #[error("no player in slot {0}")]
    UnknownSlot(usize),

    #[error("cannot spectate yourself")]
    SelfTarget,

    #[error("player '{0}' is not playing")]
    TargetNotPlaying(String),
}

/// This controller builds the standings widget for every connected player,
/// and coalesces refreshes of it.
#[derive(Clone)]
pub struct WidgetController {
    state: Arc<RwLock<WidgetState>>,
    server: Arc<dyn Server>,
    live_players: Arc<dyn LivePlayers>,
    live_knockout: Arc<dyn LiveKnockout>,
    max_slots: usize,
    refresh_interval: Duration,
}

struct WidgetState {
    /// Set when the standings changed since the last refresh.
    needs_refresh: bool,

    last_refresh: Option<Instant>,

    /// The logins in each player's widget rows, as last sent to them.
    slots: HashMap<String, Vec<String>>,
}

impl WidgetController {
    pub fn init(
        server: &Arc<dyn Server>,
        live_players: &Arc<dyn LivePlayers>,
        live_knockout: &Arc<dyn LiveKnockout>,
        max_slots: usize,
        refresh_millis: u64,
    ) -> Self {
        WidgetController {
            state: Arc::new(RwLock::new(WidgetState {
                needs_refresh: false,
                last_refresh: None,
                slots: HashMap::new(),
            })),
            server: server.clone(),
            live_players: live_players.clone(),
            live_knockout: live_knockout.clone(),
            max_slots,
            refresh_interval: Duration::from_millis(refresh_millis),
        }
    }

    /// Refresh all widgets with the next tick.
    pub async fn request_refresh(&self) {
        self.state.write().await.needs_refresh = true;
    }

    /// Refresh all widgets if requested, but at most once per interval.
    pub async fn refresh_if_due(&self) {
        let now = Instant::now();
        {
            let mut state = self.state.write().await;
            if !state.needs_refresh {
                return;
            }
            let due = match state.last_refresh {
                Some(last) => now.duration_since(last) >= self.refresh_interval,
                None => true,
            };
            if !due {
                return;
            }
            state.needs_refresh = false;
            state.last_refresh = Some(now);
        }
        self.refresh_all().await;
    }

    /// Send the widget to every connected player now.
    pub async fn refresh_all(&self) {
        let logins: Vec<String> = self
            .live_players
            .info_all()
            .await
            .into_iter()
            .map(|info| info.login)
            .collect();
        join_all(logins.iter().map(|login| self.show_for(login))).await;
    }

    /// Send the widget to one player, if there is a match.
    pub async fn show_for(&self, login: &str) {
        let widget = {
            let state = self.live_knockout.lock().await;
            KnockoutWidget::new(&state, login, self.max_slots)
        };
        let widget = match widget {
            Some(widget) => widget,
            None => return,
        };

        let slots = widget.rows.iter().map(|row| row.login.clone()).collect();
        self.state
            .write()
            .await
            .slots
            .insert(login.to_string(), slots);

        // Assume any fault is due to the target player disconnecting.
        let _ = self.server.send_manialink_to(&widget.render(), login).await;
    }

    /// Remove the widget for every connected player.
    pub async fn hide_all(&self) {
        {
            let mut state = self.state.write().await;
            state.slots.clear();
            state.needs_refresh = false;
        }

        let hidden = KnockoutWidget::hidden();
        let players = self.live_players.info_all().await;
        join_all(
            players
                .iter()
                .map(|info| self.server.send_manialink_to(&hidden, &info.login)),
        )
        .await;
    }

    /// Forget the rows sent to a player that disconnected.
    pub async fn forget(&self, login: &str) {
        self.state.write().await.slots.remove(login);
    }

    /// Let a spectator follow the player in the given row of their widget.
    ///
    /// Returns the login of the spectated player.
    pub async fn spectate(&self, viewer: &str, slot: usize) -> Result<String, SpectateError> {
        let target = {
            let players = self.live_players.lock().await;
            let viewer_info = players
                .info(viewer)
                .ok_or_else(|| SpectateError::NotConnected(viewer.to_string()))?;
            if !viewer_info.spectator {
                return Err(SpectateError::NotSpectating(viewer.to_string()));
            }

            let state = self.state.read().await;
            let target = state
                .slots
                .get(viewer)
                .and_then(|slots| slots.get(slot))
                .ok_or(SpectateError::UnknownSlot(slot))?;
            if target == viewer {
                return Err(SpectateError::SelfTarget);
            }
            if !players.is_playing(target) {
                return Err(SpectateError::TargetNotPlaying(target.clone()));
            }
            target.clone()
        };

        // Assume any fault is due to either player disconnecting.
        let _ = self.server.force_spectator_target(viewer, &target).await;
        Ok(target)
    }
}
