use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ta_knockout::config::Config;
use ta_knockout::controller::Controller;
use ta_knockout::server::{self, GameString, MapInfo, PlayerInfo, Server, ServerEvent};

const HIDDEN: &str = r#"<manialink id="tako"></manialink>"#;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Chat(String),
    ChatTo(String, Vec<String>),
    Manialink(String, String),
    Spectate(String, String),
}

/// Records every call, and pretends that a fixed set of players is connected.
struct MockServer {
    players: Vec<PlayerInfo>,
    calls: Mutex<Vec<Call>>,
}

impl MockServer {
    fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Server for MockServer {
    async fn players(&self) -> Vec<PlayerInfo> {
        self.players.clone()
    }

    async fn chat_send(&self, msg: &str) -> server::Result<()> {
        self.record(Call::Chat(msg.to_string()));
        Ok(())
    }

    async fn chat_send_to(&self, msg: &str, logins: Vec<&str>) -> server::Result<()> {
        let logins = logins.into_iter().map(String::from).collect();
        self.record(Call::ChatTo(msg.to_string(), logins));
        Ok(())
    }

    async fn send_manialink_to(&self, xml: &str, login: &str) -> server::Result<()> {
        self.record(Call::Manialink(xml.to_string(), login.to_string()));
        Ok(())
    }

    async fn force_spectator_target(
        &self,
        spectator_login: &str,
        target_login: &str,
    ) -> server::Result<()> {
        self.record(Call::Spectate(
            spectator_login.to_string(),
            target_login.to_string(),
        ));
        Ok(())
    }
}

fn player(login: &str, spectator: bool) -> PlayerInfo {
    PlayerInfo {
        login: login.to_string(),
        nick_name: GameString::from(format!("$f80{}", login)),
        spectator,
    }
}

/// A controller with four playing players, and a spectating admin.
async fn setup(name: &str) -> (Controller, Arc<MockServer>, PathBuf) {
    setup_with(name, "").await
}

async fn setup_with(name: &str, extra_config: &str) -> (Controller, Arc<MockServer>, PathBuf) {
    let _ = env_logger::builder().is_test(true).try_init();

    let log_dir = std::env::temp_dir().join(format!("tako-it-{}-{}", name, std::process::id()));
    let repr = format!(
        r#"
            server_login = "ko_test"
            admin_whitelist = ["admin"]
            log_dir = '{}'
            {}
        "#,
        log_dir.display(),
        extra_config
    );
    let config = Config::from_toml(&repr).expect("valid config");

    let mock = Arc::new(MockServer {
        players: vec![
            player("p1", false),
            player("p2", false),
            player("p3", false),
            player("p4", false),
            player("admin", true),
        ],
        calls: Mutex::new(Vec::new()),
    });
    let server = mock.clone() as Arc<dyn Server>;
    let controller = Controller::init(config, server)
        .await
        .expect("controller init");
    (controller, mock, log_dir)
}

fn chat(login: &str, message: &str) -> ServerEvent {
    ServerEvent::PlayerChat {
        login: login.to_string(),
        message: message.to_string(),
    }
}

fn finish(login: &str, time_millis: i64) -> ServerEvent {
    ServerEvent::PlayerFinish {
        login: login.to_string(),
        time_millis,
        timestamp: None,
    }
}

fn begin_race() -> ServerEvent {
    ServerEvent::BeginRace {
        map: Some(MapInfo {
            uid: "uid42".to_string(),
            name: GameString::from("$o$0f0Green Loop".to_string()),
            author: "nadeo".to_string(),
        }),
    }
}

fn announcements(calls: &[Call]) -> Vec<&str> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Chat(msg) => Some(msg.as_str()),
            _ => None,
        })
        .collect()
}

fn replies<'a>(calls: &'a [Call], to: &str) -> Vec<&'a str> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::ChatTo(msg, logins) if logins.iter().any(|l| l == to) => Some(msg.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_full_match() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("full").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("started TA KO with 4 players!"));
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::Manialink(xml, login) if login == "p1" && xml.contains(r#"id="tako""#)
    )));

    // First map: the two slowest are out.
    controller.on_server_event(begin_race()).await;
    controller.on_server_event(finish("p1", 40_000)).await;
    controller.on_server_event(finish("p2", 41_000)).await;
    controller.on_server_event(finish("p3", 42_000)).await;
    controller.on_server_event(finish("p4", 43_000)).await;
    controller.on_server_event(finish("p4", 0)).await;
    mock.take_calls();

    controller.on_server_event(ServerEvent::EndRace).await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(2, msgs.len());
    assert!(msgs[0].contains("Eliminated players"));
    let p3 = msgs[0].find("p3").expect("p3 eliminated");
    let p4 = msgs[0].find("p4").expect("p4 eliminated");
    assert!(p3 < p4);
    assert!(!msgs[0].contains("p1"));
    assert!(msgs[1].contains("Entry to the competition is now closed!"));

    // Second map: p2 is faster this time, and wins.
    controller.on_server_event(begin_race()).await;
    controller.on_server_event(finish("p1", 50_000)).await;
    controller.on_server_event(finish("p2", 49_000)).await;
    controller.on_server_event(finish("p3", 30_000)).await;
    controller.on_server_event(ServerEvent::EndRace).await;

    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(3, msgs.len());
    assert!(msgs[0].contains("p1"));
    assert!(msgs[1].contains("And the winner is..."));
    assert!(msgs[1].contains("p2"));
    assert!(msgs[2].contains("TA KO finished. Thanks for playing!"));
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::Manialink(xml, login) if login == "p2" && xml.trim() == HIDDEN
    )));

    let log = tokio::fs::read_to_string(log_dir.join("tako.log.ko_test.txt")).await?;
    assert!(log.contains(" - TA KO started\n"));
    assert!(log.contains("tako map 1 on [Green Loop] (uid42,nadeo)\n"));
    assert!(log.contains("\n=== TAKO Final result ===\n"));
    assert!(log.contains("tako map 2 on [Green Loop] (uid42,nadeo)\n"));
    assert!(log.contains("1,1,p2,alive,null,0:49.000,49000,p2,$f80p2\n"));
    assert!(log.contains("2,2,p1,eliminated,2,0:50.000,50000,p1,$f80p1\n"));
    assert!(log.contains("4,4,p4,eliminated,1,null,null,p4,$f80p4\n"));
    assert!(log.ends_with(" - TA KO stopped\n\n\n"));

    let mut results = tokio::fs::read_dir(log_dir.join("htmlResults")).await?;
    let page = results.next_entry().await?.expect("a results page");
    let html = tokio::fs::read_to_string(page.path()).await?;
    assert!(html.contains("Total players: 4"));
    assert!(html.contains(r#"<td class="elim">Winner</td>"#));

    // The match is over.
    controller.on_server_event(chat("admin", "/tako off")).await;
    let calls = mock.take_calls();
    assert_eq!(
        vec!["$z$fff$s$fc0/tako off - Error - TA KO is not running."],
        replies(&calls, "admin")
    );

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

#[tokio::test]
async fn test_commands_require_admin() {
    let (controller, mock, _) = setup("guest").await;

    controller.on_server_event(chat("p1", "/tako on")).await;
    controller.on_server_event(chat("p1", "/tako elim 3")).await;
    assert!(mock.take_calls().is_empty());

    // Other chat messages are left alone, even for admins.
    controller.on_server_event(chat("admin", "gl hf")).await;
    assert!(mock.take_calls().is_empty());
}

#[tokio::test]
async fn test_start_twice() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("twice").await;

    controller.on_server_event(chat("admin", "/tako start")).await;
    mock.take_calls();
    controller.on_server_event(chat("admin", "/TAKO ON")).await;
    let calls = mock.take_calls();
    assert!(announcements(&calls).is_empty());
    assert_eq!(
        vec!["$z$fff$s$fc0/tako on - Error - TA KO is already running."],
        replies(&calls, "admin")
    );

    controller.on_server_event(chat("admin", "/tako stop")).await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(1, msgs.len());
    assert!(msgs[0].ends_with("(admin) stopped TA KO."));
    let hidden: Vec<&Call> = calls
        .iter()
        .filter(|call| matches!(call, Call::Manialink(xml, _) if xml.trim() == HIDDEN))
        .collect();
    assert_eq!(5, hidden.len());

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

#[tokio::test]
async fn test_elim_settings() {
    let (controller, mock, _) = setup("elim").await;

    controller.on_server_event(chat("admin", "/tako elim 9")).await;
    let calls = mock.take_calls();
    let msgs = replies(&calls, "admin");
    assert_eq!(1, msgs.len());
    assert!(msgs[0].ends_with("/tako elim - Error - Enter a valid number, min 1, max 7"));

    controller.on_server_event(chat("admin", "/tako e fast")).await;
    let calls = mock.take_calls();
    let msgs = replies(&calls, "admin");
    assert_eq!(2, msgs.len());
    assert!(msgs[0].ends_with("Unknown argument 'fast'."));
    assert!(msgs[1].contains("Usage: /tako elim [num 1-7]|smooth|cotd|ktlc|custom"));
    assert!(msgs[1].contains("2 elim per map"));

    controller.on_server_event(chat("admin", "/tako elim Smooth")).await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("set TA KO elimination thresholds to 'smooth':"));

    controller
        .on_server_event(chat("admin", "/tako elim custom 20=3 x"))
        .await;
    let calls = mock.take_calls();
    assert!(announcements(&calls).is_empty());
    let msgs = replies(&calls, "admin");
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("Invalid threshold format: x (expected X=Y)"));

    controller
        .on_server_event(chat("admin", "/tako elim custom 20=3 6=1"))
        .await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("'custom'"));

    controller.on_server_event(chat("admin", "/tako elim")).await;
    let calls = mock.take_calls();
    let msgs = replies(&calls, "admin");
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("custom: 20=3 > 6=1"));
    assert!(msgs[0].ends_with("(thresholds)"));
}

#[tokio::test]
async fn test_nobody_finished() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("nobody").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    controller.on_server_event(begin_race()).await;
    mock.take_calls();

    controller.on_server_event(ServerEvent::EndRace).await;
    let calls = mock.take_calls();
    let msgs = announcements(&calls);
    assert_eq!(1, msgs.len());
    assert!(msgs[0].contains("Nobody set a time, no eliminations."));

    // Entry is still open, and the late player joins as alive.
    controller
        .on_server_event(ServerEvent::PlayerConnect {
            login: "late".to_string(),
            nick_name: GameString::from("Late".to_string()),
            spectator: false,
        })
        .await;
    let calls = mock.take_calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        Call::Manialink(xml, login) if login == "late" && xml.contains("$i$oalive")
    )));

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

#[tokio::test]
async fn test_paused_eliminations() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("paused").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    controller.on_server_event(chat("admin", "/tako p")).await;
    let calls = mock.take_calls();
    assert!(announcements(&calls)
        .last()
        .map_or(false, |msg| msg.ends_with("(admin) paused TA KO.")));

    controller.on_server_event(begin_race()).await;
    controller.on_server_event(finish("p1", 40_000)).await;
    controller.on_server_event(ServerEvent::EndRace).await;
    assert!(announcements(&mock.take_calls()).is_empty());

    controller.on_server_event(chat("admin", "/tako pause")).await;
    let calls = mock.take_calls();
    assert!(announcements(&calls)[0].ends_with("(admin) resumed TA KO!"));

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

#[tokio::test]
async fn test_spectate_slot() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("spectate").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    controller.on_server_event(begin_race()).await;
    controller.on_server_event(finish("p2", 40_000)).await;
    controller.on_server_event(finish("p1", 41_000)).await;
    controller
        .on_server_event(ServerEvent::PlayerShowWidgets {
            login: "admin".to_string(),
        })
        .await;
    controller
        .on_server_event(ServerEvent::PlayerShowWidgets {
            login: "p1".to_string(),
        })
        .await;
    mock.take_calls();

    let answer = |login: &str, slot: usize| ServerEvent::PlayerAnswer {
        login: login.to_string(),
        answer: format!(r#"{{"action":"SpectateSlot","slot":{}}}"#, slot),
    };

    controller.on_server_event(answer("admin", 0)).await;
    assert_eq!(
        vec![Call::Spectate("admin".to_string(), "p2".to_string())],
        mock.take_calls()
    );

    // Rejected: players cannot be forced to spectate, and slots must exist.
    controller.on_server_event(answer("p1", 0)).await;
    controller.on_server_event(answer("admin", 9)).await;
    controller.on_server_event(answer("nobody", 0)).await;
    assert!(mock.take_calls().is_empty());

    // Rejected: the target went to spectate.
    controller
        .on_server_event(ServerEvent::PlayerInfoChanged {
            login: "p2".to_string(),
            nick_name: GameString::from("$f80p2".to_string()),
            spectator: true,
        })
        .await;
    mock.take_calls();
    controller.on_server_event(answer("admin", 0)).await;
    assert!(mock.take_calls().is_empty());

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

fn manialinks<'a>(calls: &'a [Call], to: &str) -> Vec<&'a str> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::Manialink(xml, login) if login == to => Some(xml.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_spectators_do_not_compete() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup("spectators").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    let calls = mock.take_calls();
    assert!(announcements(&calls)[0].contains("with 4 players!"));
    let admin_view = manialinks(&calls, "admin");
    assert_eq!(1, admin_view.len());
    assert!(admin_view[0].contains("$i$oEntry open"));

    // Connecting as a spectator while entry is open does not register either.
    controller
        .on_server_event(ServerEvent::PlayerConnect {
            login: "watcher".to_string(),
            nick_name: GameString::from("Watcher".to_string()),
            spectator: true,
        })
        .await;
    let calls = mock.take_calls();
    let watcher_view = manialinks(&calls, "watcher");
    assert_eq!(1, watcher_view.len());
    assert!(watcher_view[0].contains("$i$oEntry open"));
    assert!(!watcher_view[0].contains("$i$oalive"));

    // Starting to play while entry is open does.
    controller
        .on_server_event(ServerEvent::PlayerInfoChanged {
            login: "watcher".to_string(),
            nick_name: GameString::from("Watcher".to_string()),
            spectator: false,
        })
        .await;
    controller
        .on_server_event(ServerEvent::PlayerShowWidgets {
            login: "watcher".to_string(),
        })
        .await;
    let calls = mock.take_calls();
    let watcher_view = manialinks(&calls, "watcher");
    assert_eq!(1, watcher_view.len());
    assert!(watcher_view[0].contains("$i$oalive"));

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}

#[tokio::test]
async fn test_widget_refresh_is_coalesced() -> anyhow::Result<()> {
    let (controller, mock, log_dir) = setup_with("refresh", "widget_refresh_millis = 500").await;

    controller.on_server_event(chat("admin", "/tako on")).await;
    controller.on_server_event(begin_race()).await;
    mock.take_calls();

    // Finishes only request a refresh.
    controller.on_server_event(finish("p1", 40_000)).await;
    controller.on_server_event(finish("p2", 41_000)).await;
    controller.on_server_event(finish("p3", 42_000)).await;
    assert!(mock.take_calls().is_empty());

    controller.on_tick().await;
    let calls = mock.take_calls();
    assert_eq!(5, calls.len());
    assert_eq!(1, manialinks(&calls, "p1").len());
    assert!(manialinks(&calls, "p1")[0].contains("0:40.000"));

    // Nothing changed since.
    controller.on_tick().await;
    assert!(mock.take_calls().is_empty());

    // Changed, but the last refresh was too recent.
    controller.on_server_event(finish("p4", 43_000)).await;
    controller.on_tick().await;
    assert!(mock.take_calls().is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(600)).await;
    controller.on_tick().await;
    let calls = mock.take_calls();
    assert_eq!(5, calls.len());
    assert!(manialinks(&calls, "p4")[0].contains("0:43.000"));

    tokio::fs::remove_dir_all(&log_dir).await?;
    Ok(())
}
