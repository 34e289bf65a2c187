use serde::Serialize;

use crate::knockout::{PlayerRecord, Registry, Status};
use crate::server::GameString;

/// A snapshot of one player's standing, as it is logged after every map
/// and at the end of a match.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub current_rank: usize,
    pub final_rank: Option<usize>,
    pub login: String,
    pub status: Status,
    pub elimination_round: Option<u32>,
    pub best_time_millis: Option<usize>,
    pub nick_name: GameString,
}

impl StandingsEntry {
    pub fn best_time_formatted(&self) -> Option<String> {
        self.best_time_millis.map(fmt_time)
    }
}

impl From<&PlayerRecord> for StandingsEntry {
    fn from(p: &PlayerRecord) -> Self {
        StandingsEntry {
            current_rank: p.rank,
            final_rank: p.final_position,
            login: p.login.clone(),
            status: p.status,
            elimination_round: p.elimination_round,
            best_time_millis: p.best_time_millis,
            nick_name: p.nick_name.clone(),
        }
    }
}

/// Snapshot every player in ranking order.
pub(super) fn snapshot(registry: &Registry) -> Vec<StandingsEntry> {
    registry.iter().map(StandingsEntry::from).collect()
}

/// Turn the number of milliseconds into a readable run time,
/// f.e. '0:48.051' for '48051'.
pub fn fmt_time(millis: usize) -> String {
    let secs = millis / 1000;
    let millis = millis % 1000;
    let mins = secs / 60;
    let secs = secs % 60;
    format!("{}:{:02}.{:03}", mins, secs, millis)
}
