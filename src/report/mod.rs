use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::constants::HTML_RESULT_DIR;
use crate::knockout::StandingsEntry;
use crate::server::MapInfo;

pub use html::*;
pub use logfile::*;

mod html;
mod logfile;

/// Writes the match log, and the results page at the end of a match.
///
/// Files are named after the server login, so that multiple servers
/// can share the same log directory:
/// - `<log_dir>/tako.log.<server>.txt`
/// - `<log_dir>/htmlResults/tako.<server>.<date>.html`
#[derive(Debug, Clone)]
pub struct ReportWriter {
    log_dir: PathBuf,
    server_login: String,
    generate_html: bool,
}

impl ReportWriter {
    pub fn new(config: &Config) -> Self {
        ReportWriter {
            log_dir: config.log_dir.clone(),
            server_login: config.server_login.clone(),
            generate_html: config.generate_html_result,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir
            .join(format!("tako.log.{}.txt", self.server_login))
    }

    pub async fn log_started(&self, now: &DateTime<Local>) -> anyhow::Result<()> {
        self.append(&started_block(now)).await
    }

    pub async fn log_stopped(&self, now: &DateTime<Local>) -> anyhow::Result<()> {
        self.append(&stopped_block(now)).await
    }

    /// Append the standings after a map. Set `final_result` when the match has a winner.
    pub async fn log_standings(
        &self,
        now: &DateTime<Local>,
        map_number: u32,
        map: Option<&MapInfo>,
        standings: &[StandingsEntry],
        final_result: bool,
    ) -> anyhow::Result<()> {
        let block = standings_block(now, map_number, map, standings, final_result);
        self.append(&block).await
    }

    /// Write a results page, unless disabled in the config.
    ///
    /// Returns the path of the written file.
    pub async fn write_results(
        &self,
        now: &DateTime<Local>,
        standings: &[StandingsEntry],
    ) -> anyhow::Result<Option<PathBuf>> {
        if !self.generate_html {
            return Ok(None);
        }

        let html = render_results(&now.format("%Y-%m-%d %H:%M:%S").to_string(), standings)?;

        let dir = self.log_dir.join(HTML_RESULT_DIR);
        fs::create_dir_all(&dir).await?;

        let file_name = format!(
            "tako.{}.{}.html",
            self.server_login,
            now.format("%Y-%m-%d_%H-%M-%S")
        );
        let path = dir.join(file_name);
        fs::write(&path, html).await?;

        log::info!("wrote results to {}", path.display());
        Ok(Some(path))
    }

    async fn append(&self, text: &str) -> anyhow::Result<()> {
        ensure_dir(&self.log_dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_file())
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

async fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).await
}
