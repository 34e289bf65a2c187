use thiserror::Error;

use crate::constants::{MAX_ELIMS, MIN_ELIMS};
use crate::knockout::{EliminationRule, ThresholdError, ThresholdPresets, ThresholdSchedule};

/// Admin chat commands that control the knockout mode.
///
/// Sub-commands are case-insensitive, and have the aliases
/// `start` for `on`, `stop` for `off`, `p` for `pause`, and `e` for `elim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnockoutCommand<'a> {
    /// Start a match with every connected player.
    ///
    /// Usage: `/tako on`
    Start,

    /// Stop the running match without a winner. Its state is lost.
    ///
    /// Usage: `/tako off`
    Stop,

    /// Pause or resume eliminations, f.e. to restart a map.
    ///
    /// Usage: `/tako pause`
    TogglePause,

    /// Print the usage of `/tako elim`, and the current setting.
    ///
    /// Usage: `/tako elim`
    ElimUsage,

    /// Set a fixed number of eliminations per map, or select a preset
    /// threshold schedule.
    ///
    /// Usage: `/tako elim <num|preset>`
    SetElim(&'a str),

    /// Print the usage of `/tako elim custom`.
    ///
    /// Usage: `/tako elim custom`
    CustomUsage,

    /// Set a custom threshold schedule.
    ///
    /// Usage: `/tako elim custom <alivePlayers=elimAmount> ...`
    SetThresholds(Vec<&'a str>),

    /// Print the command reference.
    ///
    /// Usage: any other `/tako` command
    Help,
}

impl<'a> KnockoutCommand<'a> {
    /// Parse a chat message. Returns `None` if it is not a `/tako` command.
    pub fn parse(chat_message: &'a str) -> Option<Self> {
        use KnockoutCommand::*;

        let parts: Vec<&str> = chat_message.split_whitespace().collect();
        let args = match &parts[..] {
            [cmd, args @ ..] if cmd.eq_ignore_ascii_case("/tako") => args,
            _ => return None,
        };

        let sub_cmd = args.first().map(|s| s.to_lowercase());
        let sub_cmd = match sub_cmd.as_deref() {
            Some("start") => "on",
            Some("stop") => "off",
            Some("p") => "pause",
            Some("e") => "elim",
            Some(other) => other,
            None => "",
        };

        let cmd = match (sub_cmd, &args[args.len().min(1)..]) {
            ("on", _) => Start,
            ("off", _) => Stop,
            ("pause", _) => TogglePause,
            ("elim", []) => ElimUsage,
            ("elim", [custom]) if custom.eq_ignore_ascii_case("custom") => CustomUsage,
            ("elim", [custom, pairs @ ..]) if custom.eq_ignore_ascii_case("custom") => {
                SetThresholds(pairs.to_vec())
            }
            ("elim", [arg, ..]) => SetElim(*arg),
            _ => Help,
        };
        Some(cmd)
    }
}

/// Rejected `/tako elim` arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElimSettingError {
    #[error("Enter a valid number, min {}, max {}", MIN_ELIMS, MAX_ELIMS)]
    InvalidNumber,

    #[error("Unknown argument '{0}'.")]
    UnknownArgument(String),

    #[error(transparent)]
    InvalidThresholds(#[from] ThresholdError),
}

/// Resolve `/tako elim <num|preset>`. Preset names take precedence.
pub fn parse_elim_arg(
    arg: &str,
    presets: &ThresholdPresets,
) -> Result<EliminationRule, ElimSettingError> {
    let arg = arg.trim();
    if let Some((name, schedule)) = presets.get(arg) {
        return Ok(EliminationRule::Thresholds {
            name: name.to_string(),
            schedule: schedule.clone(),
        });
    }
    match arg.parse::<i64>() {
        Ok(n) if n >= MIN_ELIMS as i64 && n <= MAX_ELIMS as i64 => {
            Ok(EliminationRule::Fixed(n as usize))
        }
        Ok(_) => Err(ElimSettingError::InvalidNumber),
        Err(_) => Err(ElimSettingError::UnknownArgument(arg.to_lowercase())),
    }
}

/// Resolve `/tako elim custom <pairs>`.
pub fn parse_custom_thresholds(pairs: &[&str]) -> Result<EliminationRule, ElimSettingError> {
    let schedule = ThresholdSchedule::parse(pairs.iter().copied())?;
    Ok(EliminationRule::Thresholds {
        name: "custom".to_string(),
        schedule,
    })
}
