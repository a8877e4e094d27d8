use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque ID types for type safety
pub type PlayerId = u32;
pub type SessionId = String;

/// A participant in the pass-the-device cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Language the secret word is drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
}

impl Language {
    /// Storage representation (`"english"` / `"german"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::German => "german",
        }
    }

    /// ISO 639-1 code, used by remote word sources
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "german" | "de" => Some(Language::German),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roster indices of the players who do not know the word.
///
/// Built once per session by [`crate::assign::assign`] and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct ImposterSet(BTreeSet<usize>);

impl ImposterSet {
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Whether this set is a valid assignment for the given roster shape
    pub fn fits(&self, roster_size: usize, imposter_count: usize) -> bool {
        self.0.len() == imposter_count && self.0.iter().all(|&i| i < roster_size)
    }
}

impl FromIterator<usize> for ImposterSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Position in the reveal sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum RevealState {
    NotStarted,
    /// Device handed to player `index`, role still hidden
    ShowingPlayer(usize),
    /// Player `index` is looking at their role
    AwaitingReveal(usize),
    /// Everyone has seen their role, discussion phase
    Finished,
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealState::NotStarted => f.write_str("NotStarted"),
            RevealState::ShowingPlayer(i) => write!(f, "ShowingPlayer({i})"),
            RevealState::AwaitingReveal(i) => write!(f, "AwaitingReveal({i})"),
            RevealState::Finished => f.write_str("Finished"),
        }
    }
}

/// What a single player sees once their role is visible
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleCard {
    Imposter,
    Regular { word: String },
}

/// Where the secret word of a session came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WordOrigin {
    /// The configured word source produced it
    Source,
    /// The source was unavailable and the built-in list was used
    Fallback,
}
