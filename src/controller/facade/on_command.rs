use crate::chat::{
    parse_custom_thresholds, parse_elim_arg, ElimSettingError, KnockoutCommand, PlayerMessage,
    ServerMessage,
};
use crate::controller::{Controller, LiveKnockout, LivePlayers};
use crate::knockout::EliminationRule;
use crate::server::GameString;

impl Controller {
    /// Execute an admin command.
    pub(super) async fn on_command(&self, from_login: &str, cmd: KnockoutCommand<'_>) {
        use KnockoutCommand::*;

        log::debug!("command of {}: {:?}", from_login, &cmd);

        let admin_name = self
            .players
            .nick_name(from_login)
            .await
            .unwrap_or_else(|| GameString::from(from_login.to_string()));

        match cmd {
            Start => {
                let players: Vec<(String, GameString)> = self
                    .players
                    .lock()
                    .await
                    .info_playing()
                    .into_iter()
                    .map(|info| (info.login.clone(), info.nick_name.clone()))
                    .collect();

                match self.knockout.start(players).await {
                    Ok(summary) => {
                        let msg = ServerMessage::Started {
                            admin_name: &admin_name,
                            nb_players: summary.nb_players,
                            elim_count: summary.elim_count,
                        };
                        self.chat.announce(msg).await;
                        self.log_started().await;
                        self.widget.refresh_all().await;
                    }
                    Err(err) => {
                        log::warn!("{} tried to start a match: {}", from_login, err);
                        self.tell_error("/tako on", &err, from_login).await;
                    }
                }
            }

            Stop => match self.knockout.stop().await {
                Ok(_) => {
                    self.chat
                        .announce(ServerMessage::Stopped {
                            admin_name: &admin_name,
                        })
                        .await;
                    self.log_stopped().await;
                    self.widget.hide_all().await;
                }
                Err(err) => {
                    log::warn!("{} tried to stop a match: {}", from_login, err);
                    self.tell_error("/tako off", &err, from_login).await;
                }
            },

            TogglePause => {
                let msg = if self.knockout.toggle_pause().await {
                    ServerMessage::Paused {
                        admin_name: &admin_name,
                    }
                } else {
                    ServerMessage::Resumed {
                        admin_name: &admin_name,
                    }
                };
                self.chat.announce(msg).await;
                self.widget.request_refresh().await;
            }

            ElimUsage => self.tell_elim_usage(from_login).await,

            SetElim(arg) => match parse_elim_arg(arg, self.knockout.presets()) {
                Ok(rule) => self.set_rule(rule, &admin_name).await,
                Err(err) => {
                    self.tell_error("/tako elim", &err, from_login).await;
                    if let ElimSettingError::UnknownArgument(_) = err {
                        self.tell_elim_usage(from_login).await;
                    }
                }
            },

            CustomUsage => self.chat.tell(PlayerMessage::CustomUsage, from_login).await,

            SetThresholds(pairs) => match parse_custom_thresholds(&pairs) {
                Ok(rule) => self.set_rule(rule, &admin_name).await,
                Err(err) => self.tell_error("/tako elim custom", &err, from_login).await,
            },

            Help => {
                self.chat
                    .tell(PlayerMessage::CommandReference, from_login)
                    .await
            }
        }
    }

    async fn set_rule(&self, rule: EliminationRule, admin_name: &GameString) {
        let msg = match &rule {
            EliminationRule::Fixed(elim_count) => ServerMessage::ElimCountSet {
                admin_name,
                elim_count: *elim_count,
            },
            EliminationRule::Thresholds { name, schedule } => ServerMessage::ThresholdsSet {
                admin_name,
                name,
                schedule,
            },
        };
        self.chat.announce(msg).await;
        self.knockout.set_rule(rule).await;
        self.widget.request_refresh().await;
    }

    async fn tell_elim_usage(&self, to_login: &str) {
        let state = self.knockout.lock().await;
        let msg = PlayerMessage::ElimUsage {
            preset_names: self.knockout.presets().names().collect(),
            current: &state.settings().rule,
        };
        self.chat.tell(msg, to_login).await;
    }

    async fn tell_error<E>(&self, command: &str, error: &E, to_login: &str)
    where
        E: std::fmt::Display + Sync,
    {
        let msg = PlayerMessage::CommandError { command, error };
        self.chat.tell(msg, to_login).await;
    }
}
