use serde::Serialize;

use crate::knockout::{PlayerRecord, Registry};
use crate::server::GameString;

/// How close a displayed player is to being eliminated.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Would be eliminated if the map ended now.
    Danger,

    /// The best player that is not in danger.
    Bubble,

    Safe,
}

/// A row in a viewer's standings overlay.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    /// Rank among the alive players.
    pub rank: usize,
    pub login: String,
    pub nick_name: GameString,
    pub best_time_millis: Option<usize>,
    pub zone: Zone,
    pub is_viewer: bool,
}

/// Pick the alive players worth showing to the given viewer, in ranking order.
///
/// With more alive players than slots, the players at risk come first, then the
/// leader, the viewer and their neighbours, the runners-up, and finally
/// the worst remaining players.
pub fn select_display(
    registry: &Registry,
    viewer: &str,
    elimination_count: usize,
    max_slots: usize,
) -> Vec<DisplayEntry> {
    let alive: Vec<&PlayerRecord> = registry.alive().collect();
    let alive_count = alive.len();
    if alive_count == 0 {
        return Vec::new();
    }

    let max_slots = max_slots.min(alive_count);

    // Rank 1 is never in danger.
    let danger_start = alive_count.saturating_sub(elimination_count).max(1);

    let mut picked: Vec<usize> = Vec::with_capacity(max_slots);
    let mut add = |idx: usize| {
        if picked.len() < max_slots && !picked.contains(&idx) {
            picked.push(idx);
        }
    };

    for idx in danger_start..alive_count {
        add(idx);
    }
    add(danger_start - 1);
    add(0);

    let viewer_idx = alive.iter().position(|p| p.login == viewer);
    if let Some(idx) = viewer_idx {
        add(idx);
        if idx > 0 {
            add(idx - 1);
        }
        if idx + 1 < alive_count {
            add(idx + 1);
        }
    }

    for idx in 1..alive_count.min(3) {
        add(idx);
    }
    for idx in (0..alive_count).rev() {
        add(idx);
    }

    picked.sort_unstable();
    picked
        .into_iter()
        .map(|idx| {
            let p = alive[idx];
            let zone = if idx >= danger_start {
                Zone::Danger
            } else if idx + 1 == danger_start {
                Zone::Bubble
            } else {
                Zone::Safe
            };
            DisplayEntry {
                rank: idx + 1,
                login: p.login.clone(),
                nick_name: p.nick_name.clone(),
                best_time_millis: p.best_time_millis,
                zone,
                is_viewer: p.login == viewer,
            }
        })
        .collect()
}
