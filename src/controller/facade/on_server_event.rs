use chrono::Utc;

use crate::chat::ServerMessage;
use crate::controller::{Controller, LivePlayers, PlayerDiff};
use crate::knockout::{EliminationRound, RaceEndOutcome};
use crate::server::{GameString, PlayerInfo, ServerEvent};
use crate::widget::Action;

impl Controller {
    /// React to an event of the host. Events are handled one at a time.
    pub async fn on_server_event(&self, event: ServerEvent) {
        log::debug!("{:?}", &event);
        match event {
            ServerEvent::PlayerConnect { .. } | ServerEvent::PlayerInfoChanged { .. } => {
                if let Some(info) = event.player_info() {
                    let diff = self.players.update_player(info).await;
                    self.on_player_diff(diff).await;
                }
            }

            ServerEvent::PlayerDisconnect { login } => {
                let diff = self.players.remove_player(&login).await;
                self.on_player_diff(diff).await;
            }

            ServerEvent::BeginRace { map } => {
                if self.knockout.begin_race(map).await {
                    self.widget.request_refresh().await;
                }
            }

            ServerEvent::PlayerFinish {
                login,
                time_millis,
                timestamp,
            } => {
                let nick_name = self
                    .players
                    .nick_name(&login)
                    .await
                    .unwrap_or_else(|| GameString::from(login.clone()));
                let at = timestamp.unwrap_or_else(Utc::now);
                if self
                    .knockout
                    .finish_run(&login, &nick_name, time_millis, at)
                    .await
                {
                    self.widget.request_refresh().await;
                }
            }

            ServerEvent::EndRace => {
                let outcome = self.knockout.end_race().await;
                self.on_race_end(outcome).await;
            }

            ServerEvent::PlayerShowWidgets { login } => {
                self.widget.show_for(&login).await;
            }

            ServerEvent::PlayerAnswer { login, answer } => {
                if let Some(action) = Action::from_answer(&answer) {
                    self.on_action(&login, action).await;
                }
            }

            ServerEvent::PlayerChat { login, message } => {
                if let Some(cmd) = self.chat.forward(&message, &login) {
                    self.on_command(&login, cmd).await;
                }
            }
        }
    }

    async fn on_player_diff(&self, diff: Option<PlayerDiff>) {
        match diff {
            Some(PlayerDiff::Add(info)) => {
                self.register_competitor(&info).await;
                self.widget.show_for(&info.login).await;
            }
            Some(PlayerDiff::Update(info)) => {
                self.register_competitor(&info).await;
                self.widget.request_refresh().await;
            }
            Some(PlayerDiff::Remove(info)) => {
                self.widget.forget(&info.login).await;
            }
            None => {}
        }
    }

    /// Only players that are not spectating compete, the same as when
    /// a match is started. A spectator that starts playing is registered then.
    async fn register_competitor(&self, info: &PlayerInfo) {
        if info.spectator {
            return;
        }
        if let Some(status) = self.knockout.add_player(&info.login, &info.nick_name).await {
            log::info!("{} joined the match as {}", info.login, status);
            self.widget.request_refresh().await;
        }
    }

    async fn on_race_end(&self, outcome: RaceEndOutcome) {
        use RaceEndOutcome::*;

        match outcome {
            NotRunning => {}

            Paused => {
                self.widget.request_refresh().await;
            }

            NoAlivePlayers => {
                log::info!("no alive players left to eliminate");
            }

            NobodyFinished => {
                self.chat.announce(ServerMessage::NobodyFinished).await;
            }

            Eliminated(round) => {
                self.announce_round(&round).await;
                self.log_round(&round, false).await;
                self.widget.request_refresh().await;
            }

            Winner { round, winner } => {
                log::info!("{} won the match on map {}", winner.login, round.map_number);
                self.announce_round(&round).await;
                self.chat
                    .announce(ServerMessage::Winner {
                        nick_name: &winner.nick_name,
                    })
                    .await;
                self.log_round(&round, true).await;
                self.write_results(&round).await;
                self.log_stopped().await;
                self.widget.hide_all().await;
                self.chat.announce(ServerMessage::Finished).await;
            }
        }
    }

    async fn announce_round(&self, round: &EliminationRound) {
        // A match with a single player is won without eliminations.
        if !round.eliminated.is_empty() {
            let msg = ServerMessage::Eliminated {
                nick_names: round.eliminated.iter().map(|p| &p.nick_name).collect(),
            };
            self.chat.announce(msg).await;
        }

        if round.closed_entry {
            self.chat.announce(ServerMessage::EntryClosed).await;
        }
    }
}
