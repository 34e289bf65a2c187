use chrono::{DateTime, TimeZone};

use crate::knockout::StandingsEntry;
use crate::server::MapInfo;

/// A line in the log when a match starts.
pub fn started_block<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("\n{} - TA KO started\n", now.format("%m/%d,%H:%M:%S"))
}

/// A line in the log when a match stops, with or without a winner.
pub fn stopped_block<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("\n{} - TA KO stopped\n\n\n", now.format("%m/%d,%H:%M:%S"))
}

/// The standings after a map, f.e.
/// ```text
/// 05/14,21:03:44
/// tako map 3 on [Snow Loop] (XJ0b2...,Nadeo)
/// 1,null,alice,alive,null,0:48.051,48051,Alice,$f00Alice
/// 2,null,bob,alive,null,0:49.102,49102,Bob,$0f0Bob
/// 3,3,carol,eliminated,2,null,null,Carol,Carol
/// ```
pub fn standings_block<Tz>(
    now: &DateTime<Tz>,
    map_number: u32,
    map: Option<&MapInfo>,
    standings: &[StandingsEntry],
    final_result: bool,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut block = String::new();
    if final_result {
        block.push_str("\n=== TAKO Final result ===");
    }
    block.push('\n');
    block.push_str(&now.format("%m/%d,%H:%M:%S").to_string());

    let (uid, name, author) = match map {
        Some(map) => (map.uid.as_str(), map.name.plain(), map.author.as_str()),
        None => ("UID", String::new(), ""),
    };
    block.push_str(&format!(
        "\ntako map {} on [{}] ({},{})\n",
        map_number, name, uid, author
    ));

    for entry in standings {
        block.push_str(&standings_line(entry));
        block.push('\n');
    }
    block
}

/// `currentRank,finalRank,login,status,eliminationRound,bestTime,bestTimeMillis,nickPlain,nickFormatted`
pub fn standings_line(entry: &StandingsEntry) -> String {
    fn or_null<T: ToString>(value: Option<T>) -> String {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    let nick_formatted = escape_commas(&entry.nick_name.formatted);
    let nick_plain = escape_commas(&entry.nick_name.plain());

    format!(
        "{},{},{},{},{},{},{},{},{}",
        entry.current_rank,
        or_null(entry.final_rank),
        entry.login,
        entry.status,
        or_null(entry.elimination_round),
        or_null(entry.best_time_formatted()),
        or_null(entry.best_time_millis),
        nick_plain,
        nick_formatted,
    )
}

fn escape_commas(text: &str) -> String {
    text.replace(',', "&#44;")
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::knockout::Status;
    use crate::server::GameString;

    fn entry() -> StandingsEntry {
        StandingsEntry {
            current_rank: 1,
            final_rank: None,
            login: "alice".to_string(),
            status: Status::Alive,
            elimination_round: None,
            best_time_millis: Some(48051),
            nick_name: GameString::from("$f00Ali,ce".to_string()),
        }
    }

    #[test]
    fn test_standings_line() {
        assert_eq!(
            "1,null,alice,alive,null,0:48.051,48051,Ali&#44;ce,$f00Ali&#44;ce",
            standings_line(&entry())
        );

        let mut eliminated = entry();
        eliminated.current_rank = 4;
        eliminated.final_rank = Some(4);
        eliminated.status = Status::Eliminated;
        eliminated.elimination_round = Some(2);
        eliminated.best_time_millis = None;
        assert_eq!(
            "4,4,alice,eliminated,2,null,null,Ali&#44;ce,$f00Ali&#44;ce",
            standings_line(&eliminated)
        );
    }

    #[test]
    fn test_standings_block() {
        let now = Utc.ymd(2025, 11, 7).and_hms(21, 3, 44);
        let map = MapInfo {
            uid: "abc".to_string(),
            name: GameString::from("$o$f00Snow".to_string()),
            author: "Nadeo".to_string(),
        };
        let block = standings_block(&now, 3, Some(&map), &[entry()], true);
        assert_eq!(
            "\n=== TAKO Final result ===\n11/07,21:03:44\ntako map 3 on [Snow] (abc,Nadeo)\n\
             1,null,alice,alive,null,0:48.051,48051,Ali&#44;ce,$f00Ali&#44;ce\n",
            block
        );
    }

    #[test]
    fn test_lifecycle_lines() {
        let now = Utc.ymd(2025, 1, 2).and_hms(3, 4, 5);
        assert_eq!("\n01/02,03:04:05 - TA KO started\n", started_block(&now));
        assert_eq!("\n01/02,03:04:05 - TA KO stopped\n\n\n", stopped_block(&now));
    }
}
