use serde::{Deserialize, Serialize};

/// Actions are triggered by clicking on widget elements,
/// and allow players to interact with the controller.
///
/// Each of the variants can be parsed from JSON objects, f.e.:
/// `{"action":"SpectateSlot","slot":3}`
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(tag = "action")]
pub enum Action {
    /// Spectate the player in the n-th row of the standings widget,
    /// starting at zero.
    SpectateSlot { slot: usize },
}

impl Action {
    /// Parse an action from a widget answer, or `None` if the answer
    /// is not meant for this controller.
    pub fn from_answer(answer: &str) -> Option<Action> {
        match serde_json::from_str::<Action>(answer) {
            Ok(action) => Some(action),
            Err(err) => {
                log::debug!("ignoring widget answer '{}': {}", answer, err);
                None
            }
        }
    }

    /// The JSON representation used in widget templates.
    pub fn to_answer(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
