use serde::Serialize;

use crate::knockout::{DisplayEntry, EliminationRule, KnockoutState, Status, Zone};
use crate::server::GameString;
use crate::widget::ser::{
    format_nick_name, format_position, format_position_opt, format_run_time, format_xml_text,
};
use crate::widget::{Action, Widget};

/// The standings overlay of a knockout match, personalized for one viewer.
///
/// # Sending
/// - Send this widget to every player when the standings change, but not
///   more often than the configured refresh interval.
/// - Send it to a player that connects, or asks to see the widgets again.
/// - Remove it for everyone when the match stops.
#[derive(Serialize, Debug)]
pub struct KnockoutWidget {
    /// The number of players that are eliminated on this map.
    pub kos_this_map: usize,

    /// The alive count at which the number of eliminations changes,
    /// if a threshold schedule is in effect.
    pub kos_until: Option<usize>,

    /// The viewer's status, or whether the entry is still open.
    #[serde(serialize_with = "format_xml_text")]
    pub status: String,

    /// Either "Rank" or "Final Rank".
    pub rank_label: &'static str,

    #[serde(serialize_with = "format_xml_text")]
    pub rank: String,

    /// Show a veil over the widget while eliminations are paused.
    pub paused: bool,

    pub rows: Vec<KnockoutWidgetRow>,
}

/// One player row of the `KnockoutWidget`.
#[derive(Serialize, Debug)]
pub struct KnockoutWidgetRow {
    pub rank: usize,

    /// The player in this row, which is the target of its spectate action.
    #[serde(skip)]
    pub login: String,

    #[serde(serialize_with = "format_nick_name")]
    pub nick_name: GameString,

    #[serde(serialize_with = "format_run_time")]
    pub best_time_millis: Option<usize>,

    /// Color code for the run time, depending on the row's zone.
    pub color: &'static str,

    /// Highlight the viewer's own row.
    pub is_viewer: bool,

    /// Draw the elimination line below this row.
    pub divider_after: bool,

    /// Vertical position of the row's labels.
    #[serde(serialize_with = "format_position")]
    pub y: f32,

    /// Vertical position of the elimination line, if drawn below this row.
    #[serde(serialize_with = "format_position_opt")]
    pub divider_y: Option<f32>,

    /// Clicking the row lets spectators spectate this player.
    pub action: String,
}

impl Widget for KnockoutWidget {
    const FILE: &'static str = "knockout.j2";
    const ID: &'static str = "tako";
}

impl KnockoutWidget {
    /// Build the widget for the given viewer. Returns `None` if there is no match.
    pub fn new(state: &KnockoutState, viewer: &str, max_slots: usize) -> Option<KnockoutWidget> {
        let m = state.current()?;
        let entries = state.display_list(viewer, max_slots);

        let alive_count = m.registry().alive_count();
        let kos_this_map = m.elimination_count().min(alive_count.saturating_sub(1));
        let kos_until = match state.settings().rule {
            EliminationRule::Thresholds { .. } => m.next_threshold(),
            EliminationRule::Fixed(_) => None,
        };

        let entry_text = if m.entry_open() {
            "Entry open"
        } else {
            "Entry closed"
        };
        let viewer_record = m.player(viewer);
        let status = match viewer_record {
            Some(p) if p.status != Status::Spectator => p.status.to_string(),
            _ => entry_text.to_string(),
        };
        let (rank_label, rank) = match viewer_record {
            Some(p) if p.status == Status::Alive => ("Rank", p.rank.to_string()),
            Some(p) if p.status == Status::Eliminated => (
                "Final Rank",
                p.final_position.map(|r| r.to_string()).unwrap_or_default(),
            ),
            _ if m.entry_open() => ("Rank", "No rank yet".to_string()),
            _ => ("Rank", "Not Playing".to_string()),
        };

        Some(KnockoutWidget {
            kos_this_map,
            kos_until,
            status,
            rank_label,
            rank,
            paused: state.settings().paused,
            rows: to_rows(entries),
        })
    }
}

fn to_rows(entries: Vec<DisplayEntry>) -> Vec<KnockoutWidgetRow> {
    const ROW_HEIGHT: f32 = 3.0;
    const DIVIDER_HEIGHT: f32 = 1.0;

    let first_danger = entries.iter().position(|e| e.zone == Zone::Danger);
    let mut y = -0.5;
    entries
        .into_iter()
        .enumerate()
        .map(|(slot, e)| {
            let divider_after = first_danger == Some(slot + 1);
            let row_y = y;
            y -= ROW_HEIGHT;
            let divider_y = if divider_after {
                let divider_y = y;
                y -= DIVIDER_HEIGHT;
                Some(divider_y)
            } else {
                None
            };
            KnockoutWidgetRow {
                rank: e.rank,
                login: e.login,
                nick_name: e.nick_name,
                best_time_millis: e.best_time_millis,
                color: match e.zone {
                    Zone::Danger => "$f54",
                    Zone::Bubble => "$fd0",
                    Zone::Safe => "$0d8",
                },
                is_viewer: e.is_viewer,
                divider_after,
                y: row_y,
                divider_y,
                action: Action::SpectateSlot { slot }.to_answer(),
            }
        })
        .collect()
}
