use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::knockout::display::{select_display, DisplayEntry};
use crate::knockout::elimination::{process_eliminations, RaceEndOutcome};
use crate::knockout::{PlayerRecord, Registry, Status, ThresholdOutcome, ThresholdSchedule};
use crate::server::GameString;

/// Illegal transitions of the match state.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum KnockoutError {
    #[error("TA KO is already running.")]
    AlreadyRunning,

    #[error("TA KO is not running.")]
    NotRunning,
}

/// Decides how many players are eliminated per map.
#[derive(Debug, Clone, PartialEq)]
pub enum EliminationRule {
    /// The same number of eliminations on every map.
    Fixed(usize),

    /// The number of eliminations depends on the number of alive players.
    Thresholds {
        /// A preset name, or `custom`.
        name: String,
        schedule: ThresholdSchedule,
    },
}

impl EliminationRule {
    pub fn evaluate(&self, alive_count: usize) -> ThresholdOutcome {
        match self {
            EliminationRule::Fixed(elim_count) => ThresholdOutcome {
                elim_count: *elim_count,
                next_boundary: None,
            },
            EliminationRule::Thresholds { schedule, .. } => schedule.evaluate(alive_count),
        }
    }
}

impl Display for EliminationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EliminationRule::Fixed(n) => write!(f, "{} elim per map", n),
            EliminationRule::Thresholds { name, schedule } => {
                write!(f, "{}: {}", name, schedule.join(" > "))
            }
        }
    }
}

/// Settings that outlive a single match.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationSettings {
    pub rule: EliminationRule,

    /// While paused, races end without eliminations.
    pub paused: bool,
}

/// A running match.
#[derive(Debug, Clone)]
pub struct Match {
    pub(super) registry: Registry,

    /// While open, new players join as alive, otherwise as spectators.
    /// Closes with the first elimination.
    pub(super) entry_open: bool,

    /// Starts at 1, and advances after every map that eliminated players.
    pub(super) map_number: u32,

    /// The number of players to eliminate on this map.
    pub(super) elimination_count: usize,

    /// The alive count at which a threshold schedule will change
    /// the elimination count.
    pub(super) next_threshold: Option<usize>,
}

impl Match {
    fn new(rule: &EliminationRule) -> Self {
        let mut m = Match {
            registry: Registry::new(),
            entry_open: true,
            map_number: 1,
            elimination_count: 0,
            next_threshold: None,
        };
        m.refresh_elimination_count(rule);
        m
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn player(&self, login: &str) -> Option<&PlayerRecord> {
        self.registry.get(login)
    }

    pub fn entry_open(&self) -> bool {
        self.entry_open
    }

    pub fn map_number(&self) -> u32 {
        self.map_number
    }

    pub fn elimination_count(&self) -> usize {
        self.elimination_count
    }

    pub fn next_threshold(&self) -> Option<usize> {
        self.next_threshold
    }

    fn refresh_elimination_count(&mut self, rule: &EliminationRule) {
        let outcome = rule.evaluate(self.registry.alive_count());
        if outcome.elim_count != self.elimination_count {
            log::debug!(
                "elimination count {} -> {}",
                self.elimination_count,
                outcome.elim_count
            );
        }
        self.elimination_count = outcome.elim_count;
        self.next_threshold = outcome.next_boundary;
    }

    /// Add a record for a login that was not seen before.
    /// Returns its status, or `None` if the login is known.
    fn register(
        &mut self,
        login: &str,
        nick_name: &GameString,
        rule: &EliminationRule,
    ) -> Option<Status> {
        if self.registry.contains(login) {
            return None;
        }
        let status = if self.entry_open {
            Status::Alive
        } else {
            Status::Spectator
        };
        self.registry
            .insert(PlayerRecord::new(login, nick_name.clone(), status));
        if self.entry_open {
            self.refresh_elimination_count(rule);
        }
        self.registry.sort();
        Some(status)
    }
}

/// The complete state of the knockout mode: settings, and the match
/// if one is running.
///
/// All operations are synchronous and never block. Callers are expected to
/// serialize access, so that only one event is processed at a time.
#[derive(Debug, Clone)]
pub struct KnockoutState {
    settings: EliminationSettings,
    current: Option<Match>,
}

impl KnockoutState {
    pub fn new(rule: EliminationRule) -> Self {
        KnockoutState {
            settings: EliminationSettings {
                rule,
                paused: false,
            },
            current: None,
        }
    }

    pub fn settings(&self) -> &EliminationSettings {
        &self.settings
    }

    pub fn current(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    /// Start a match where all of the given players are alive.
    pub fn start<I>(&mut self, players: I) -> Result<&Match, KnockoutError>
    where
        I: IntoIterator<Item = (String, GameString)>,
    {
        if self.current.is_some() {
            return Err(KnockoutError::AlreadyRunning);
        }
        let mut m = Match::new(&self.settings.rule);
        for (login, nick_name) in players {
            m.register(&login, &nick_name, &self.settings.rule);
        }
        log::info!(
            "match started with {} players",
            m.registry.alive_count()
        );
        Ok(self.current.get_or_insert(m))
    }

    /// Discard the running match, without a winner.
    pub fn stop(&mut self) -> Result<Match, KnockoutError> {
        let m = self.current.take().ok_or(KnockoutError::NotRunning)?;
        log::info!("match stopped on map {}", m.map_number);
        Ok(m)
    }

    /// Pause or resume eliminations. Returns `true` if now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.settings.paused = !self.settings.paused;
        log::info!(
            "eliminations {}",
            if self.settings.paused { "paused" } else { "resumed" }
        );
        self.settings.paused
    }

    /// Replace the elimination rule. A running match picks it up immediately.
    pub fn set_rule(&mut self, rule: EliminationRule) {
        log::info!("elimination rule: {}", rule);
        if let Some(m) = &mut self.current {
            m.refresh_elimination_count(&rule);
        }
        self.settings.rule = rule;
    }

    /// Returns the status of a newly registered player, or `None`
    /// if there is no match, or the player is already known.
    pub fn on_player_connect(&mut self, login: &str, nick_name: &GameString) -> Option<Status> {
        let rule = &self.settings.rule;
        self.current
            .as_mut()
            .and_then(|m| m.register(login, nick_name, rule))
    }

    /// Forget the times of the previous map. Returns `false` if there is no match.
    pub fn on_race_begin(&mut self) -> bool {
        let m = match &mut self.current {
            Some(m) => m,
            None => return false,
        };
        for p in m.registry.iter_mut() {
            p.clear_time();
        }
        m.refresh_elimination_count(&self.settings.rule);
        m.registry.sort();
        true
    }

    /// Record a finished run. Players that were not seen before are
    /// registered first.
    ///
    /// Returns `true` if the ranking of alive players may have changed.
    pub fn on_player_finish(
        &mut self,
        login: &str,
        nick_name: &GameString,
        time_millis: i64,
        at: DateTime<Utc>,
    ) -> bool {
        if time_millis <= 0 {
            return false;
        }
        let rule = &self.settings.rule;
        let m = match &mut self.current {
            Some(m) => m,
            None => return false,
        };

        let added = m.register(login, nick_name, rule).is_some();
        let (improved, alive) = match m.registry.get_mut(login) {
            Some(p) => (p.improve(time_millis as usize, at), p.is_alive()),
            None => return added,
        };
        if improved && alive {
            m.registry.sort();
        }
        added || (improved && alive)
    }

    /// Eliminate players at the end of a map. A winner ends the match.
    pub fn on_race_end(&mut self) -> RaceEndOutcome {
        let m = match &mut self.current {
            Some(m) => m,
            None => return RaceEndOutcome::NotRunning,
        };
        if self.settings.paused {
            m.registry.sort();
            log::info!("eliminations paused, skipping eliminations");
            return RaceEndOutcome::Paused;
        }

        let outcome = process_eliminations(m);
        if let RaceEndOutcome::Winner { .. } = outcome {
            self.current = None;
        }
        outcome
    }

    /// The standings rows for the given viewer.
    pub fn display_list(&self, viewer: &str, max_slots: usize) -> Vec<DisplayEntry> {
        match &self.current {
            Some(m) => select_display(&m.registry, viewer, m.elimination_count, max_slots),
            None => Vec::new(),
        }
    }
}
