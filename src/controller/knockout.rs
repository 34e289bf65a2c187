use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::knockout::{
    EliminationRule, KnockoutError, KnockoutState, Match, RaceEndOutcome, Status,
    ThresholdPresets,
};
use crate::server::{GameString, MapInfo};

/// Use to look at the knockout match, without changing it.
#[async_trait]
pub trait LiveKnockout: Send + Sync {
    /// While holding this guard, the state is read-only, and can be referenced.
    async fn lock(&self) -> RwLockReadGuard<'_, KnockoutState>;

    /// The presets that admins can select by name.
    fn presets(&self) -> &ThresholdPresets;

    /// The map that is currently played, if known.
    async fn current_map(&self) -> Option<MapInfo>;
}

/// Summary of a match that was just started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSummary {
    pub nb_players: usize,
    pub elim_count: usize,
}

/// This controller is the only writer of the knockout state.
#[derive(Clone)]
pub struct KnockoutController {
    state: Arc<RwLock<KnockoutState>>,
    map: Arc<RwLock<Option<MapInfo>>>,
    presets: Arc<ThresholdPresets>,
}

impl KnockoutController {
    pub fn init(rule: EliminationRule, presets: ThresholdPresets) -> Self {
        KnockoutController {
            state: Arc::new(RwLock::new(KnockoutState::new(rule))),
            map: Arc::new(RwLock::new(None)),
            presets: Arc::new(presets),
        }
    }

    /// Start a match with the given players.
    pub async fn start<I>(&self, players: I) -> Result<StartSummary, KnockoutError>
    where
        I: IntoIterator<Item = (String, GameString)>,
    {
        let mut state = self.state.write().await;
        let m: &Match = state.start(players)?;
        Ok(StartSummary {
            nb_players: m.registry().alive_count(),
            elim_count: m.elimination_count(),
        })
    }

    /// Discard the running match.
    pub async fn stop(&self) -> Result<Match, KnockoutError> {
        self.state.write().await.stop()
    }

    /// Returns `true` if eliminations are paused now.
    pub async fn toggle_pause(&self) -> bool {
        self.state.write().await.toggle_pause()
    }

    pub async fn set_rule(&self, rule: EliminationRule) {
        self.state.write().await.set_rule(rule)
    }

    pub async fn add_player(&self, login: &str, nick_name: &GameString) -> Option<Status> {
        self.state.write().await.on_player_connect(login, nick_name)
    }

    /// Remember the loaded map, and reset times. Returns `false` if there is no match.
    pub async fn begin_race(&self, map: Option<MapInfo>) -> bool {
        *self.map.write().await = map;
        self.state.write().await.on_race_begin()
    }

    /// Returns `true` if the ranking may have changed.
    pub async fn finish_run(
        &self,
        login: &str,
        nick_name: &GameString,
        time_millis: i64,
        at: DateTime<Utc>,
    ) -> bool {
        self.state
            .write()
            .await
            .on_player_finish(login, nick_name, time_millis, at)
    }

    pub async fn end_race(&self) -> RaceEndOutcome {
        self.state.write().await.on_race_end()
    }
}

#[async_trait]
impl LiveKnockout for KnockoutController {
    async fn lock(&self) -> RwLockReadGuard<'_, KnockoutState> {
        self.state.read().await
    }

    fn presets(&self) -> &ThresholdPresets {
        &self.presets
    }

    async fn current_map(&self) -> Option<MapInfo> {
        self.map.read().await.clone()
    }
}
