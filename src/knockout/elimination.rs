use crate::knockout::standings::{snapshot, StandingsEntry};
use crate::knockout::{Match, PlayerRecord};

/// What happened at the end of a race.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceEndOutcome {
    /// There is no match running.
    NotRunning,

    /// Eliminations are paused, and nobody was eliminated.
    Paused,

    /// There is no one left to eliminate.
    NoAlivePlayers,

    /// None of the alive players finished the map. Nobody is eliminated,
    /// and the same map number is played again.
    NobodyFinished,

    /// Players were eliminated, and the match continues.
    Eliminated(EliminationRound),

    /// Only one player remains, and the match has ended.
    Winner {
        round: EliminationRound,
        winner: PlayerRecord,
    },
}

/// The result of one elimination pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationRound {
    /// The map number at which the players were eliminated.
    pub map_number: u32,

    /// Eliminated players, best first.
    pub eliminated: Vec<PlayerRecord>,

    /// `true` if this was the first elimination, which closed the entry.
    pub closed_entry: bool,

    /// Standings after the eliminations.
    pub standings: Vec<StandingsEntry>,
}

/// Eliminate the slowest alive players on this map.
///
/// Every alive player without a time is eliminated, even if that exceeds
/// the elimination count. The fastest player always survives.
/// Players eliminated in the same pass get the worst remaining final positions,
/// the slowest one getting the worst.
pub(super) fn process_eliminations(m: &mut Match) -> RaceEndOutcome {
    m.registry.sort();

    let (alive_count, eliminated_logins) = {
        // Alive players come first in the ranking, with those that have no time
        // at the very end. The elimination set is therefore always the tail.
        let alive: Vec<&PlayerRecord> = m.registry.alive().collect();
        let alive_count = alive.len();
        if alive_count == 0 {
            log::info!("no alive players, nothing to eliminate");
            return RaceEndOutcome::NoAlivePlayers;
        }

        let no_time_count = alive.iter().filter(|p| !p.has_time()).count();
        if no_time_count == alive_count {
            log::info!("nobody finished map {}, no eliminations", m.map_number);
            return RaceEndOutcome::NobodyFinished;
        }

        let desired = m.elimination_count.min(alive_count - 1);
        let elim_total = desired.max(no_time_count);
        let logins: Vec<String> = alive[alive_count - elim_total..]
            .iter()
            .map(|p| p.login.clone())
            .collect();
        (alive_count, logins)
    };

    // slowest first
    for (offset, login) in eliminated_logins.iter().rev().enumerate() {
        if let Some(p) = m.registry.get_mut(login) {
            p.eliminate(m.map_number, alive_count - offset);
        }
    }

    let eliminated: Vec<PlayerRecord> = eliminated_logins
        .iter()
        .filter_map(|login| m.registry.get(login))
        .cloned()
        .collect();

    let closed_entry = m.entry_open && !eliminated.is_empty();
    if closed_entry {
        m.entry_open = false;
    }

    log::info!(
        "eliminated on map {}: {:?}",
        m.map_number,
        eliminated.iter().map(|p| &p.login).collect::<Vec<_>>()
    );

    m.registry.sort();

    let winner_login = match m.registry.alive().collect::<Vec<_>>()[..] {
        [only] => Some(only.login.clone()),
        _ => None,
    };

    if let Some(winner) = winner_login.and_then(|login| m.registry.get_mut(&login)) {
        winner.crown();
        let winner = winner.clone();
        log::info!("winner is '{}'", winner.login);

        m.registry.sort();
        let round = EliminationRound {
            map_number: m.map_number,
            eliminated,
            closed_entry,
            standings: snapshot(&m.registry),
        };
        return RaceEndOutcome::Winner { round, winner };
    }

    let round = EliminationRound {
        map_number: m.map_number,
        eliminated,
        closed_entry,
        standings: snapshot(&m.registry),
    };
    m.map_number += 1;
    RaceEndOutcome::Eliminated(round)
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::knockout::{EliminationRule, KnockoutState, Status};
    use crate::server::GameString;

    fn start(elims: usize, logins: &[&str]) -> KnockoutState {
        let mut state = KnockoutState::new(EliminationRule::Fixed(elims));
        let players = logins
            .iter()
            .map(|l| (l.to_string(), GameString::from(l.to_string())));
        state.start(players).unwrap();
        state
    }

    fn finish(state: &mut KnockoutState, login: &str, millis: i64) {
        let at = Utc.timestamp_millis_opt(1_000 + millis).unwrap();
        state.on_player_finish(login, &GameString::from(login.to_string()), millis, at);
    }

    fn logins(players: &[PlayerRecord]) -> Vec<&str> {
        players.iter().map(|p| p.login.as_str()).collect()
    }

    #[test]
    fn test_two_slowest_eliminated() {
        let all = ["p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8"];
        let mut state = start(2, &all);
        for (i, login) in all.iter().enumerate() {
            finish(&mut state, login, 40_000 + i as i64 * 100);
        }

        let round = match state.on_race_end() {
            RaceEndOutcome::Eliminated(round) => round,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(1, round.map_number);
        assert_eq!(vec!["p7", "p8"], logins(&round.eliminated));
        assert_eq!(Some(7), round.eliminated[0].final_position);
        assert_eq!(Some(8), round.eliminated[1].final_position);
        assert!(round.closed_entry);

        let m = state.current().unwrap();
        assert_eq!(2, m.map_number());
        assert!(!m.entry_open());
        assert_eq!(6, m.registry().alive_count());
        assert_eq!(Some(1), m.registry().get("p8").unwrap().elimination_round);
    }

    #[test]
    fn test_no_time_players_exceed_budget() {
        let mut state = start(1, &["a", "b", "c"]);
        finish(&mut state, "a", 50_000);

        match state.on_race_end() {
            RaceEndOutcome::Winner { round, winner } => {
                assert_eq!("a", winner.login);
                assert_eq!(Some(1), winner.final_position);
                assert_eq!(vec!["b", "c"], logins(&round.eliminated));
                assert_eq!(Some(2), round.eliminated[0].final_position);
                assert_eq!(Some(3), round.eliminated[1].final_position);
                assert_eq!("a", round.standings[0].login);
                assert_eq!(Some(1), round.standings[0].final_rank);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(state.current().is_none());
    }

    #[test]
    fn test_nobody_finished_keeps_map_number() {
        let mut state = start(2, &["a", "b", "c"]);
        assert_eq!(RaceEndOutcome::NobodyFinished, state.on_race_end());

        let m = state.current().unwrap();
        assert_eq!(1, m.map_number());
        assert!(m.entry_open());
        assert_eq!(3, m.registry().alive_count());
    }

    #[test]
    fn test_budget_capped_to_keep_one_alive() {
        let mut state = start(7, &["a", "b", "c"]);
        finish(&mut state, "a", 40_000);
        finish(&mut state, "b", 41_000);
        finish(&mut state, "c", 42_000);

        match state.on_race_end() {
            RaceEndOutcome::Winner { round, winner } => {
                assert_eq!("a", winner.login);
                assert_eq!(2, round.eliminated.len());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_single_player_wins_when_finished() {
        let mut state = start(2, &["solo"]);
        assert_eq!(RaceEndOutcome::NobodyFinished, state.on_race_end());

        finish(&mut state, "solo", 30_000);
        match state.on_race_end() {
            RaceEndOutcome::Winner { round, winner } => {
                assert_eq!("solo", winner.login);
                assert!(round.eliminated.is_empty());
                assert!(!round.closed_entry);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_equal_times_earlier_survives() {
        let mut state = start(1, &["a", "b", "c"]);
        let t0 = Utc.timestamp_millis_opt(1_000).unwrap();
        let t1 = Utc.timestamp_millis_opt(2_000).unwrap();
        state.on_player_finish("c", &GameString::from("c".to_string()), 40_000, t0);
        state.on_player_finish("b", &GameString::from("b".to_string()), 45_000, t0);
        state.on_player_finish("a", &GameString::from("a".to_string()), 45_000, t1);

        match state.on_race_end() {
            RaceEndOutcome::Eliminated(round) => assert_eq!(vec!["a"], logins(&round.eliminated)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_final_positions_are_permutation() {
        let all: Vec<String> = (0..17).map(|i| format!("p{:02}", i)).collect();
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let mut state = start(3, &refs);

        let mut map = 0;
        let final_standings = loop {
            map += 1;
            assert!(map < 50, "match did not end");
            state.on_race_begin();

            let alive: Vec<String> = state
                .current()
                .unwrap()
                .registry()
                .alive()
                .map(|p| p.login.clone())
                .collect();
            for (i, login) in alive.iter().enumerate() {
                // every fifth player (rotating) fails to finish
                if (i + map) % 5 == 0 {
                    continue;
                }
                let millis = 30_000 + ((i * 7919 + map * 104_729) % 10_000) as i64;
                finish(&mut state, login, millis);
            }

            match state.on_race_end() {
                RaceEndOutcome::Winner { round, .. } => break round.standings,
                RaceEndOutcome::Eliminated(_) | RaceEndOutcome::NobodyFinished => {}
                other => panic!("unexpected outcome {:?}", other),
            }
        };

        let mut positions: Vec<usize> = final_standings
            .iter()
            .map(|e| e.final_rank.unwrap())
            .collect();
        positions.sort_unstable();
        assert_eq!((1..=17).collect::<Vec<usize>>(), positions);

        let winners: Vec<&StandingsEntry> = final_standings
            .iter()
            .filter(|e| e.final_rank == Some(1))
            .collect();
        assert_eq!(1, winners.len());
        assert_eq!(Status::Alive, winners[0].status);
    }

    #[test]
    fn test_paused_skips_eliminations() {
        let mut state = start(2, &["a", "b", "c"]);
        finish(&mut state, "a", 40_000);
        assert!(state.toggle_pause());
        assert_eq!(RaceEndOutcome::Paused, state.on_race_end());
        assert_eq!(3, state.current().unwrap().registry().alive_count());
    }
}
