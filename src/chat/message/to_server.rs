use std::fmt::{Display, Formatter};

use crate::chat::message::{pluralize, write_and_reset, write_highlighted, write_start_message};
use crate::knockout::ThresholdSchedule;
use crate::server::GameString;

/// Chat announcements from the controller to all players.
pub enum ServerMessage<'a> {
    /// An admin started a match.
    Started {
        admin_name: &'a GameString,
        nb_players: usize,
        elim_count: usize,
    },

    /// An admin stopped the match without a winner.
    Stopped { admin_name: &'a GameString },

    /// The match has ended with a winner.
    Finished,

    /// An admin paused eliminations.
    Paused { admin_name: &'a GameString },

    /// An admin resumed eliminations.
    Resumed { admin_name: &'a GameString },

    /// An admin set a fixed number of eliminations per map.
    ElimCountSet {
        admin_name: &'a GameString,
        elim_count: usize,
    },

    /// An admin selected a preset, or custom threshold schedule.
    ThresholdsSet {
        admin_name: &'a GameString,
        name: &'a str,
        schedule: &'a ThresholdSchedule,
    },

    /// None of the alive players finished the map.
    NobodyFinished,

    /// Players were eliminated at the end of the map.
    Eliminated { nick_names: Vec<&'a GameString> },

    /// The first players were eliminated, and nobody can join anymore.
    EntryClosed,

    /// The last player standing.
    Winner { nick_name: &'a GameString },
}

impl Display for ServerMessage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ServerMessage::*;

        write_start_message(f)?;

        match self {
            Started {
                admin_name,
                nb_players,
                elim_count,
            } => {
                write_and_reset(f, admin_name)?;
                write!(
                    f,
                    " (admin) started TA KO with {}! Eliminations per map: ",
                    pluralize("player", *nb_players)
                )?;
                write_highlighted(f, elim_count)
            }

            Stopped { admin_name } => {
                write_and_reset(f, admin_name)?;
                write!(f, " (admin) stopped TA KO.")
            }

            Finished => write!(f, "TA KO finished. Thanks for playing!"),

            Paused { admin_name } => {
                write_and_reset(f, admin_name)?;
                write!(f, " (admin) paused TA KO.")
            }

            Resumed { admin_name } => {
                write_and_reset(f, admin_name)?;
                write!(f, " (admin) resumed TA KO!")
            }

            ElimCountSet {
                admin_name,
                elim_count,
            } => {
                write_and_reset(f, admin_name)?;
                write!(f, " (admin) set TA KO eliminations per map to ")?;
                write_highlighted(f, elim_count)
            }

            ThresholdsSet {
                admin_name,
                name,
                schedule,
            } => {
                write_and_reset(f, admin_name)?;
                writeln!(f, " (admin) set TA KO elimination thresholds to '{}':", name)?;
                write!(f, "{}", schedule)
            }

            NobodyFinished => write!(f, "TA KO: Nobody set a time, no eliminations."),

            Eliminated { nick_names } if nick_names.is_empty() => {
                write!(f, "TA KO: Eliminated players: (none)")
            }

            Eliminated { nick_names } => {
                write!(f, "TA KO: Eliminated players: ")?;
                for nick_name in nick_names {
                    write!(f, " - ")?;
                    write_and_reset(f, nick_name)?;
                }
                write!(f, " -")
            }

            EntryClosed => write!(f, "TA KO: Entry to the competition is now closed!"),

            Winner { nick_name } => {
                write!(f, "TA KO: And the winner is... ")?;
                write_and_reset(f, nick_name)?;
                write!(f, " !")
            }
        }
    }
}
