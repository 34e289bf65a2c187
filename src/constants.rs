/// The environment variable that has to point to the TOML config file.
pub const CONFIG_ENV_VAR: &str = "KNOCKOUT_CONFIG";

/// The smallest number of players that can be eliminated per map.
pub const MIN_ELIMS: usize = 1;

/// The largest number of players that can be eliminated per map.
///
/// This is limited by the widget, which has room for the danger zone,
/// the bubble, the leader and the viewer, next to the divider.
/// Threshold schedules also fall back to this amount when there are
/// more players alive than the largest ceiling in the schedule.
pub const MAX_ELIMS: usize = 7;

/// The number of players eliminated per map if not configured otherwise.
pub const DEFAULT_ELIM_COUNT: usize = 2;

/// The number of player rows in the knockout widget.
pub const MAX_DISPLAY_SLOTS: usize = 10;

/// Widget updates are coalesced, and sent at most once in this interval.
///
/// The host delivers events in bursts when many players cross the finish line
/// at the same time, and re-rendering for every viewer after each one is wasteful.
pub const WIDGET_REFRESH_MILLIS: u64 = 150;

/// The number of rows in each table of the HTML result page.
pub const RESULT_ROWS_PER_TABLE: usize = 25;

/// Custom threshold ceilings must be larger than this, since two players
/// are the smallest field that can still be cut.
pub const MIN_THRESHOLD_CEILING: usize = 2;

/// Sub-directory of the log directory, that will contain HTML result pages.
pub const HTML_RESULT_DIR: &str = "htmlResults";
