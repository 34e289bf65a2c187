use std::cmp::Ordering;

use crate::knockout::{PlayerRecord, Status};

/// Orders players from best to worst:
/// 1. alive before eliminated before spectators
/// 2. alive players with a time before those without; faster times first;
///    equal times go to whoever set it first, and finally to the smaller login
/// 3. eliminated players by their final position; missing positions last
/// 4. spectators are left in their current order
pub fn compare_players(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    let by_status = status_priority(a.status).cmp(&status_priority(b.status));
    if by_status != Ordering::Equal {
        return by_status;
    }

    match a.status {
        Status::Alive => compare_alive(a, b),
        Status::Eliminated => {
            let a_pos = a.final_position.unwrap_or(usize::MAX);
            let b_pos = b.final_position.unwrap_or(usize::MAX);
            a_pos.cmp(&b_pos)
        }
        Status::Spectator => Ordering::Equal,
    }
}

fn status_priority(status: Status) -> u8 {
    match status {
        Status::Alive => 1,
        Status::Eliminated => 2,
        Status::Spectator => 3,
    }
}

fn compare_alive(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    let by_time = match (a.best_time_millis, b.best_time_millis) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
        (Some(a_millis), Some(b_millis)) => a_millis
            .cmp(&b_millis)
            .then_with(|| match (a.best_time_at, b.best_time_at) {
                (Some(a_at), Some(b_at)) => a_at.cmp(&b_at),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
    };
    by_time.then_with(|| a.login.cmp(&b.login))
}
