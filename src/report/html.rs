use include_dir::{include_dir, Dir};
use lazy_static::*;
use regex::{Captures, Regex};
use serde::Serialize;
use tera::Tera;

use crate::constants::RESULT_ROWS_PER_TABLE;
use crate::knockout::{StandingsEntry, Status};
use crate::server::GameString;

const RESULTS_TEMPLATE: &str = "results.html.j2";

lazy_static! {
    static ref TEMPLATES: Tera = collect_templates().expect("failed to compile report templates");
}

fn collect_templates() -> tera::Result<Tera> {
    static TEMPLATE_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/res/report");

    let mut tera = Tera::default();
    for file in TEMPLATE_DIR.files() {
        let file_name = file.path().to_str().expect("failed to read template");
        let contents = file.contents_utf8().expect("failed to read template");
        tera.add_raw_template(file_name, contents)?;
    }
    Ok(tera)
}

#[derive(Serialize, Debug)]
struct ResultsPage {
    finished_at: String,
    total_players: usize,
    tables: Vec<Vec<Option<ResultsRow>>>,
}

#[derive(Serialize, Debug, PartialEq)]
struct ResultsRow {
    rank: String,
    winner: bool,
    nick_name: String,
    login: String,
    elim_map: String,
}

impl From<&StandingsEntry> for ResultsRow {
    fn from(entry: &StandingsEntry) -> Self {
        let winner = entry.final_rank == Some(1);
        let elim_map = match entry.elimination_round {
            _ if winner => "Winner".to_string(),
            Some(round) => round.to_string(),
            None => "-".to_string(),
        };
        ResultsRow {
            rank: entry
                .final_rank
                .map(|rank| rank.to_string())
                .unwrap_or_else(|| "-".to_string()),
            winner,
            nick_name: nick_name_to_html(&entry.nick_name),
            login: escape_html(&entry.login),
            elim_map,
        }
    }
}

/// Render a results page for the final standings of a match.
///
/// Spectators are left out. Players are listed in tables of fixed length,
/// and the last table is padded with blank rows.
pub fn render_results(finished_at: &str, standings: &[StandingsEntry]) -> tera::Result<String> {
    let rows: Vec<ResultsRow> = standings
        .iter()
        .filter(|entry| entry.status != Status::Spectator)
        .map(ResultsRow::from)
        .collect();
    let total_players = rows.len();

    let mut tables: Vec<Vec<Option<ResultsRow>>> = Vec::new();
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let mut table: Vec<Option<ResultsRow>> =
            rows.by_ref().take(RESULT_ROWS_PER_TABLE).map(Some).collect();
        table.resize_with(RESULT_ROWS_PER_TABLE, || None);
        tables.push(table);
    }

    let page = ResultsPage {
        finished_at: escape_html(finished_at),
        total_players,
        tables,
    };
    let ctxt = tera::Context::from_serialize(&page)?;
    TEMPLATES.render(RESULTS_TEMPLATE, &ctxt)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Convert a formatted nick name to HTML, keeping its colors.
///
/// Color codes open a `<span>`, and all of them are closed at the end.
/// Other formatting is removed.
pub fn nick_name_to_html(nick_name: &GameString) -> String {
    lazy_static! {
        static ref RE_DOLLAR: Regex = Regex::new(r"\${2}").unwrap();
        static ref RE_COLOR: Regex = Regex::new(r"\$([A-Fa-f0-9]{3})").unwrap();
        static ref RE_FORMATTING: Regex =
            Regex::new(r"\$[lLhHpP]\[[^\]]*\]|\$[wWnNoOiItTsSgGzZpPlLhH]").unwrap();
    }

    let escaped = escape_html(&nick_name.formatted);
    let text = RE_DOLLAR.replace_all(&escaped, "\u{0}");

    let mut open_spans = 0;
    let text = RE_COLOR.replace_all(&text, |caps: &Captures| {
        open_spans += 1;
        format!(r#"<span style="color:#{}">"#, &caps[1])
    });
    let text = RE_FORMATTING.replace_all(&text, "");

    let mut html = text.replace('\u{0}', "$");
    html.push_str(&"</span>".repeat(open_spans));
    html
}
