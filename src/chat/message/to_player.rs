use std::fmt::{Display, Formatter};

use crate::chat::message::{write_highlighted, write_start_message};
use crate::constants::{MAX_ELIMS, MIN_ELIMS};
use crate::knockout::EliminationRule;

/// Chat messages from the controller to a specific player.
pub enum PlayerMessage<'a> {
    /// Tell an admin the command reference.
    ///
    /// Output for any unknown `/tako` command
    CommandReference,

    /// Tell an admin how to use `/tako elim`, and what is currently set.
    ///
    /// Output for `/tako elim`
    ElimUsage {
        preset_names: Vec<&'a str>,
        current: &'a EliminationRule,
    },

    /// Tell an admin how to use `/tako elim custom`.
    ///
    /// Output for `/tako elim custom`
    CustomUsage,

    /// Tell an admin why their command was rejected.
    CommandError {
        command: &'a str,
        error: &'a (dyn Display + Sync),
    },
}

impl Display for PlayerMessage<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use PlayerMessage::*;

        write_start_message(f)?;

        match self {
            CommandReference => {
                writeln!(f, "/tako on|start")?;
                writeln!(f, "/tako off|stop")?;
                writeln!(
                    f,
                    "/tako pause|p (Toggles pausing eliminations, for rs/next map)"
                )?;
                write!(
                    f,
                    "/tako elim|e [num|preset|custom] (Sets elims or thresholds)"
                )
            }

            ElimUsage {
                preset_names,
                current,
            } => {
                write!(f, "Usage: /tako elim [num {}-{}]", MIN_ELIMS, MAX_ELIMS)?;
                for name in preset_names {
                    write!(f, "|{}", name)?;
                }
                writeln!(f, "|custom")?;
                write!(f, "Current elim setting: ")?;
                let kind = match current {
                    EliminationRule::Fixed(_) => "num",
                    EliminationRule::Thresholds { .. } => "thresholds",
                };
                write_highlighted(f, current)?;
                write!(f, " ({})", kind)
            }

            CustomUsage => {
                writeln!(f, "Sets custom elimination count thresholds.")?;
                writeln!(f, "Usage: /tako elim custom [alivePlayers=elimAmount] ...")?;
                writeln!(f, "Example cotd format:")?;
                write!(f, "/tako elim custom 255=4 16=2 8=1")
            }

            CommandError { command, error } => write!(f, "{} - Error - {}", command, error),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::knockout::KnockoutError;

    #[test]
    fn test_command_error() {
        let msg = PlayerMessage::CommandError {
            command: "/tako on",
            error: &KnockoutError::AlreadyRunning,
        }
        .to_string();
        assert!(msg.ends_with("/tako on - Error - TA KO is already running."));
    }

    #[test]
    fn test_elim_usage() {
        let rule = EliminationRule::Fixed(3);
        let msg = PlayerMessage::ElimUsage {
            preset_names: vec!["smooth", "cotd"],
            current: &rule,
        }
        .to_string();
        assert!(msg.contains("Usage: /tako elim [num 1-7]|smooth|cotd|custom\n"));
        assert!(msg.contains("3 elim per map"));
        assert!(msg.ends_with(" (num)"));
    }
}
