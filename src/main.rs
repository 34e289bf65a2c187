use std::sync::Arc;

use dotenv::dotenv;
use tokio::time::{interval, Duration, MissedTickBehavior};

use ta_knockout::config::Config;
use ta_knockout::controller::Controller;
use ta_knockout::server::{Server, StdioConnection};

/// The controller's entry-point.
///
/// Host events are read from stdin, and calls are written to stdout,
/// both as JSON lines. The controller exits when the event stream ends.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read environment variables from an '.env' file in the working directory.
    // We use these env vars:
    //  - RUST_LOG
    //  - KNOCKOUT_CONFIG
    let using_env_file = dotenv().is_ok();

    env_logger::init(); // Use log::* to write to stderr

    if using_env_file {
        log::info!("using .env file")
    }

    let config = Config::load()?;
    let refresh_millis = config.widget_refresh_millis;

    let mut conn = StdioConnection::open();
    let server = conn.server.clone() as Arc<dyn Server>;

    let controller = Controller::init(config, server).await?;

    let mut ticks = interval(Duration::from_millis(refresh_millis));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log::info!("running event loop...");
    loop {
        tokio::select! {
            event = conn.events.recv() => match event {
                Some(event) => controller.on_server_event(event).await,
                None => break,
            },
            _ = ticks.tick() => controller.on_tick().await,
        }
    }

    log::info!("host event stream closed, exiting");
    Ok(())
}
