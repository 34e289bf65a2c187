use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string with in-game formatting, f.e. `$f00Red$zPlain`.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct GameString {
    /// The formatted string.
    pub formatted: String,
}

impl GameString {
    pub fn from(str: String) -> Self {
        GameString { formatted: str }
    }

    /// Removes all text formatting.
    ///
    /// References:
    /// - https://doc.maniaplanet.com/client/text-formatting
    /// - https://wiki.xaseco.org/wiki/Text_formatting
    pub fn plain(&self) -> String {
        lazy_static! {
            static ref RE_DOLLAR: Regex = Regex::new(r"\${2}").unwrap();
            static ref RE_FORMATTING: Regex =
                Regex::new(r"\$[A-Fa-f0-9]{3}|\$[wWnNoOiItTsSgGzZpP]|\$[lLhHpP]\[[^\]]*\]|\$[lLhH]")
                    .unwrap();
        }

        // Escaped dollars are swapped out first, so that they are not mistaken
        // for the start of a formatting code.
        let output = RE_DOLLAR.replace_all(&self.formatted, "\u{0}");
        let output = RE_FORMATTING.replace_all(&output, "");
        output.replace('\u{0}', "$")
    }
}

impl std::fmt::Debug for GameString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.plain())
    }
}

impl std::fmt::Display for GameString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

impl<'de> Deserialize<'de> for GameString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let formatted: String = Deserialize::deserialize(deserializer)?;
        Ok(GameString { formatted })
    }
}

impl Serialize for GameString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.formatted)
    }
}

/// Information about a connected player.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct PlayerInfo {
    /// Player-unique login.
    pub login: String,

    /// Formatted nick name.
    pub nick_name: GameString,

    /// `True` if the player spectates, whether they have a player slot or not.
    #[serde(default)]
    pub spectator: bool,
}

/// Information about the map of the current race.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Default)]
pub struct MapInfo {
    pub uid: String,
    pub name: GameString,
    pub author: String,
}
