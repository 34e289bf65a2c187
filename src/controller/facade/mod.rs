use std::sync::Arc;

use chrono::Local;

use crate::config::Config;
use crate::controller::*;
use crate::knockout::{EliminationRound, EliminationRule, ThresholdPresets};
use crate::report::ReportWriter;
use crate::server::Server;

mod on_action;
mod on_command;
mod on_server_event;

/// This facade hides all specific controllers behind one interface
/// that can react to server events.
#[derive(Clone)]
pub struct Controller {
    chat: ChatController,
    players: PlayerController,
    knockout: KnockoutController,
    widget: WidgetController,
    reports: ReportWriter,
}

impl Controller {
    pub async fn init(config: Config, server: Arc<dyn Server>) -> anyhow::Result<Controller> {
        // Controllers are up-casted to Live* traits, so that other controllers
        // can read their state. This facade retains write access.

        let mut presets = ThresholdPresets::builtin();
        for preset in &config.presets {
            presets.insert(&preset.name, preset.schedule()?);
        }

        let reports = ReportWriter::new(&config);
        let config = Arc::new(config);

        let chat = ChatController::init(&server, &config);

        let players = PlayerController::init(&server).await;
        let live_players = Arc::new(players.clone()) as Arc<dyn LivePlayers>;

        let knockout =
            KnockoutController::init(EliminationRule::Fixed(config.default_elim_count), presets);
        let live_knockout = Arc::new(knockout.clone()) as Arc<dyn LiveKnockout>;

        let widget = WidgetController::init(
            &server,
            &live_players,
            &live_knockout,
            config.max_display_slots,
            config.widget_refresh_millis,
        );

        log::info!(
            "controller ready, {} player(s) connected",
            live_players.info_all().await.len()
        );

        Ok(Controller {
            chat,
            players,
            knockout,
            widget,
            reports,
        })
    }

    /// Refresh widgets if the standings changed. Call this periodically.
    pub async fn on_tick(&self) {
        self.widget.refresh_if_due().await;
    }

    async fn log_started(&self) {
        if let Err(err) = self.reports.log_started(&Local::now()).await {
            log::error!("failed to write to the match log: {:#}", err);
        }
    }

    async fn log_stopped(&self) {
        if let Err(err) = self.reports.log_stopped(&Local::now()).await {
            log::error!("failed to write to the match log: {:#}", err);
        }
    }

    async fn log_round(&self, round: &EliminationRound, final_result: bool) {
        let map = self.knockout.current_map().await;
        let res = self
            .reports
            .log_standings(
                &Local::now(),
                round.map_number,
                map.as_ref(),
                &round.standings,
                final_result,
            )
            .await;
        if let Err(err) = res {
            log::error!("failed to write to the match log: {:#}", err);
        }
    }

    async fn write_results(&self, round: &EliminationRound) {
        if let Err(err) = self
            .reports
            .write_results(&Local::now(), &round.standings)
            .await
        {
            log::error!("failed to write the results page: {:#}", err);
        }
    }
}
