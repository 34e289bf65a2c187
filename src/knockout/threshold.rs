use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use thiserror::Error;

use crate::constants::{MAX_ELIMS, MIN_ELIMS, MIN_THRESHOLD_CEILING};

/// While at most `max_alive` players are alive, eliminate `elim_count` per map.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Threshold {
    pub max_alive: usize,
    pub elim_count: usize,
}

/// Maps the number of alive players to the number of players eliminated per map.
///
/// Thresholds are kept sorted by descending `max_alive`, with unique ceilings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThresholdSchedule {
    thresholds: Vec<Threshold>,
}

/// The result of looking up the current alive count in a schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThresholdOutcome {
    /// The number of players to eliminate on the current map.
    pub elim_count: usize,

    /// The next lower ceiling that will change the elimination count,
    /// or `None` if the last threshold is already in effect.
    pub next_boundary: Option<usize>,
}

/// Invalid `[alivePlayers]=[elimAmount]` pairs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("Invalid threshold format: {0} (expected X=Y)")]
    InvalidFormat(String),

    #[error("Invalid values in: {0}")]
    InvalidValues(String),

    #[error("No valid thresholds set.")]
    Empty,
}

impl ThresholdSchedule {
    /// Build a schedule from `(max_alive, elim_count)` pairs in any order.
    /// A repeated ceiling replaces the earlier one.
    pub fn new<I>(pairs: I) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut by_ceiling = IndexMap::<usize, usize>::new();
        for (max_alive, elim_count) in pairs {
            if !is_valid_pair(max_alive, elim_count) {
                return Err(ThresholdError::InvalidValues(format!(
                    "{}={}",
                    max_alive, elim_count
                )));
            }
            by_ceiling.insert(max_alive, elim_count);
        }
        if by_ceiling.is_empty() {
            return Err(ThresholdError::Empty);
        }

        by_ceiling.sort_by(|a, _, b, _| b.cmp(a));
        let thresholds = by_ceiling
            .into_iter()
            .map(|(max_alive, elim_count)| Threshold {
                max_alive,
                elim_count,
            })
            .collect();
        Ok(ThresholdSchedule { thresholds })
    }

    /// Parse `X=Y` pairs, f.e. `["255=6", "64=4", "16=2", "8=1"]`.
    /// A single invalid pair rejects the whole schedule.
    pub fn parse<'a, I>(args: I) -> Result<Self, ThresholdError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pairs = Vec::new();
        for arg in args {
            let mut parts = arg.splitn(2, '=');
            let (ceiling, count) = match (parts.next(), parts.next()) {
                (Some(ceiling), Some(count)) => (ceiling, count),
                _ => return Err(ThresholdError::InvalidFormat(arg.to_string())),
            };
            let ceiling = ceiling.trim().parse::<usize>();
            let count = count.trim().parse::<usize>();
            match (ceiling, count) {
                (Ok(ceiling), Ok(count)) if is_valid_pair(ceiling, count) => {
                    pairs.push((ceiling, count))
                }
                _ => return Err(ThresholdError::InvalidValues(arg.to_string())),
            }
        }
        ThresholdSchedule::new(pairs)
    }

    /// Find the elimination count for the given number of alive players.
    ///
    /// Walking from the largest ceiling down, every ceiling that still fits the
    /// alive count is a tighter match. The first ceiling that does not fit is the
    /// next boundary. If not even the largest ceiling fits, `MAX_ELIMS` applies.
    pub fn evaluate(&self, alive_count: usize) -> ThresholdOutcome {
        let mut elim_count = MAX_ELIMS;
        let mut next_boundary = None;

        for threshold in &self.thresholds {
            if alive_count <= threshold.max_alive {
                elim_count = threshold.elim_count;
            } else {
                next_boundary = Some(threshold.max_alive);
                break;
            }
        }

        ThresholdOutcome {
            elim_count,
            next_boundary,
        }
    }

    /// Format as pairs joined with the given separator, f.e. `255=6 > 16=2`.
    pub fn join(&self, sep: &str) -> String {
        self.thresholds
            .iter()
            .map(|t| format!("{}={}", t.max_alive, t.elim_count))
            .collect::<Vec<String>>()
            .join(sep)
    }
}

impl Display for ThresholdSchedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.join(" "))
    }
}

fn is_valid_pair(max_alive: usize, elim_count: usize) -> bool {
    max_alive > MIN_THRESHOLD_CEILING && (MIN_ELIMS..=MAX_ELIMS).contains(&elim_count)
}

lazy_static! {
    /// Built-in schedules. 255 stands for the maximum number of players on a server.
    static ref BUILTIN_PRESETS: Vec<(&'static str, ThresholdSchedule)> = {
        let preset = |pairs: &[(usize, usize)]| {
            ThresholdSchedule::new(pairs.iter().copied()).expect("invalid built-in preset")
        };
        vec![
            // decrease by one about every other map, with two as the minimum
            (
                "smooth",
                preset(&[(255, 7), (40, 6), (28, 5), (18, 4), (10, 3), (4, 2)]),
            ),
            // Cup of the Day format
            ("cotd", preset(&[(255, 6), (64, 4), (16, 2), (8, 1)])),
            // KTLC format, extrapolated to decrease by one about every five maps
            (
                "ktlc",
                preset(&[
                    (255, 6),
                    (78, 5),
                    (53, 4),
                    (33, 3),
                    (18, 2),
                    (8, 1),
                    (3, 2),
                ]),
            ),
        ]
    };
}

/// Named schedules that admins can select by name.
#[derive(Debug, Clone)]
pub struct ThresholdPresets {
    presets: IndexMap<String, ThresholdSchedule>,
}

impl ThresholdPresets {
    /// Only the built-in presets: `smooth`, `cotd` and `ktlc`.
    pub fn builtin() -> Self {
        let presets = BUILTIN_PRESETS
            .iter()
            .map(|(name, schedule)| (name.to_string(), schedule.clone()))
            .collect();
        ThresholdPresets { presets }
    }

    /// Add a preset, or replace the one with the same name.
    pub fn insert(&mut self, name: &str, schedule: ThresholdSchedule) {
        self.presets.insert(name.to_lowercase(), schedule);
    }

    /// Look up a preset, ignoring case.
    pub fn get(&self, name: &str) -> Option<(&str, &ThresholdSchedule)> {
        self.presets
            .get_key_value(&name.to_lowercase())
            .map(|(name, schedule)| (name.as_str(), schedule))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}
