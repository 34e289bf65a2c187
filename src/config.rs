use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::*;
use crate::knockout::{ThresholdError, ThresholdSchedule};

/// Controller config.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// The login of the dedicated server. It is only used to name log files,
    /// so that multiple servers can share one log directory.
    pub server_login: String,

    /// List of player logins that are allowed to use `/tako` commands.
    #[serde(default)]
    pub admin_whitelist: Vec<String>,

    /// The directory that standings logs and HTML results are written to.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Write an HTML page with the final results when a match concludes.
    /// Such a page can be easily screenshotted and shared.
    #[serde(default = "default_true")]
    pub generate_html_result: bool,

    /// The number of players eliminated per map, unless an admin changes it.
    #[serde(default = "default_elim_count")]
    pub default_elim_count: usize,

    /// The number of player rows displayed in the widget.
    #[serde(default = "default_display_slots")]
    pub max_display_slots: usize,

    /// Widgets are refreshed at most once in this interval.
    #[serde(default = "default_refresh_millis")]
    pub widget_refresh_millis: u64,

    /// Threshold presets in addition to the built-in ones.
    #[serde(default)]
    pub presets: Vec<PresetConfig>,
}

/// A named threshold schedule, f.e.
/// ```toml
/// [[presets]]
/// name = "weekly"
/// thresholds = ["255=5", "32=3", "8=1"]
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct PresetConfig {
    pub name: String,
    pub thresholds: Vec<String>,
}

impl PresetConfig {
    pub fn schedule(&self) -> Result<ThresholdSchedule, ThresholdError> {
        ThresholdSchedule::parse(self.thresholds.iter().map(String::as_str))
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("fastlog")
}

fn default_true() -> bool {
    true
}

fn default_elim_count() -> usize {
    DEFAULT_ELIM_COUNT
}

fn default_display_slots() -> usize {
    MAX_DISPLAY_SLOTS
}

fn default_refresh_millis() -> u64 {
    WIDGET_REFRESH_MILLIS
}

/// Failed checks when loading the config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot locate config: use the '{}' env var", CONFIG_ENV_VAR)]
    MissingFile,

    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("not a valid config")]
    Parse(#[from] toml::de::Error),

    #[error("default_elim_count must be within {}..={}", MIN_ELIMS, MAX_ELIMS)]
    ElimCountOutOfRange,

    #[error("max_display_slots must be within 1..={}", MAX_DISPLAY_SLOTS)]
    DisplaySlotsOutOfRange,

    #[error("widget_refresh_millis must be greater than zero")]
    RefreshIntervalCannotBeZero,

    #[error("preset '{name}' is invalid: {source}")]
    InvalidPreset {
        name: String,
        source: ThresholdError,
    },
}

impl Config {
    /// Read the config file listed in the `KNOCKOUT_CONFIG` environment variable.
    pub fn load() -> Result<Config, ConfigError> {
        let env_file = match std::env::var(CONFIG_ENV_VAR) {
            Ok(f) => Some(PathBuf::from(f)).filter(|p| p.is_file()),
            Err(_) => None,
        };

        let f = env_file.ok_or(ConfigError::MissingFile)?;
        let f_str = std::fs::read_to_string(f)?;
        Config::from_toml(&f_str)
    }

    pub fn from_toml(repr: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(repr)?;
        config.check()?;
        Ok(config)
    }

    /// Try to catch configuration errors early.
    fn check(&self) -> Result<(), ConfigError> {
        use ConfigError::*;

        if self.default_elim_count < MIN_ELIMS || self.default_elim_count > MAX_ELIMS {
            return Err(ElimCountOutOfRange);
        }
        if self.max_display_slots == 0 || self.max_display_slots > MAX_DISPLAY_SLOTS {
            return Err(DisplaySlotsOutOfRange);
        }
        if self.widget_refresh_millis == 0 {
            return Err(RefreshIntervalCannotBeZero);
        }
        for preset in &self.presets {
            preset.schedule().map_err(|source| InvalidPreset {
                name: preset.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Returns `true` if the given login may use admin commands.
    pub fn is_admin(&self, login: &str) -> bool {
        self.admin_whitelist.iter().any(|admin| admin == login)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml(r#"server_login = "ko_server""#).unwrap();
        assert_eq!("ko_server", config.server_login);
        assert_eq!(PathBuf::from("fastlog"), config.log_dir);
        assert_eq!(DEFAULT_ELIM_COUNT, config.default_elim_count);
        assert_eq!(MAX_DISPLAY_SLOTS, config.max_display_slots);
        assert!(config.generate_html_result);
        assert!(config.admin_whitelist.is_empty());
    }

    #[test]
    fn test_elim_count_out_of_range() {
        let repr = r#"
            server_login = "ko_server"
            default_elim_count = 8
        "#;
        assert!(matches!(
            Config::from_toml(repr),
            Err(ConfigError::ElimCountOutOfRange)
        ));
    }

    #[test]
    fn test_invalid_preset() {
        let repr = r#"
            server_login = "ko_server"

            [[presets]]
            name = "broken"
            thresholds = ["255=6", "2=1"]
        "#;
        match Config::from_toml(repr) {
            Err(ConfigError::InvalidPreset { name, .. }) => assert_eq!("broken", name),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_is_admin() {
        let repr = r#"
            server_login = "ko_server"
            admin_whitelist = ["aru"]
        "#;
        let config = Config::from_toml(repr).unwrap();
        assert!(config.is_admin("aru"));
        assert!(!config.is_admin("guest"));
    }
}
