use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::knockout::ranking::compare_players;
use crate::server::GameString;

/// A player's standing in the knockout match.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Still competing, and ranked by their time on the current map.
    Alive,

    /// Knocked out. Their `final_position` is fixed.
    Eliminated,

    /// Joined after entry closed, and does not take part.
    Spectator,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Alive => "alive",
            Status::Eliminated => "eliminated",
            Status::Spectator => "spectator",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the match knows about one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub login: String,
    pub nick_name: GameString,
    pub status: Status,

    /// The player's fastest run on the current map, or `None`
    /// if they have not finished on this map.
    pub best_time_millis: Option<usize>,

    /// When the current best run was set. Used to rank equal times.
    pub best_time_at: Option<DateTime<Utc>>,

    /// Position in the current ranking, starting at 1. Overwritten by every sort.
    pub rank: usize,

    /// Overall placement, set once when eliminated or when winning.
    pub final_position: Option<usize>,

    /// The map number at which the player was eliminated.
    pub elimination_round: Option<u32>,
}

impl PlayerRecord {
    pub fn new(login: &str, nick_name: GameString, status: Status) -> Self {
        PlayerRecord {
            login: login.to_string(),
            nick_name,
            status,
            best_time_millis: None,
            best_time_at: None,
            rank: 0,
            final_position: None,
            elimination_round: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == Status::Alive
    }

    pub fn has_time(&self) -> bool {
        self.best_time_millis.is_some()
    }

    /// Keep the given run if it improves the player's best time on this map.
    /// Returns `true` if it did.
    pub fn improve(&mut self, millis: usize, at: DateTime<Utc>) -> bool {
        match self.best_time_millis {
            Some(best) if best <= millis => false,
            _ => {
                self.best_time_millis = Some(millis);
                self.best_time_at = Some(at);
                true
            }
        }
    }

    /// Forget the time of the previous map.
    pub fn clear_time(&mut self) {
        self.best_time_millis = None;
        self.best_time_at = None;
    }

    /// Knock out an alive player. Does nothing for anyone else, since
    /// a player can only ever be eliminated once.
    pub(super) fn eliminate(&mut self, map_number: u32, final_position: usize) {
        if !self.is_alive() {
            log::warn!("tried to eliminate '{}' who is {}", self.login, self.status);
            return;
        }
        self.status = Status::Eliminated;
        self.elimination_round = Some(map_number);
        self.final_position = Some(final_position);
    }

    /// Award the first place to the last alive player.
    pub(super) fn crown(&mut self) {
        debug_assert!(self.is_alive());
        self.final_position = Some(1);
    }
}

/// Records of every player seen during a match, keyed by login.
///
/// The iteration order is the ranking order after each call to `sort()`.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    players: IndexMap<String, PlayerRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn get(&self, login: &str) -> Option<&PlayerRecord> {
        self.players.get(login)
    }

    pub(super) fn get_mut(&mut self, login: &str) -> Option<&mut PlayerRecord> {
        self.players.get_mut(login)
    }

    pub fn contains(&self, login: &str) -> bool {
        self.players.contains_key(login)
    }

    /// Add a record for a login that was not seen before.
    /// Returns `false` and keeps the existing record otherwise.
    pub(super) fn insert(&mut self, record: PlayerRecord) -> bool {
        if self.players.contains_key(&record.login) {
            return false;
        }
        self.players.insert(record.login.clone(), record);
        true
    }

    /// All records in ranking order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values()
    }

    pub(super) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerRecord> {
        self.players.values_mut()
    }

    /// Alive records in ranking order.
    pub fn alive(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.iter().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Recompute the ranking from scratch, and update every record's `rank`.
    pub(super) fn sort(&mut self) {
        self.players.sort_by(|_, a, _, b| compare_players(a, b));
        for (idx, record) in self.players.values_mut().enumerate() {
            record.rank = idx + 1;
        }
    }
}
