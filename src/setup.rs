//! Roster and imposter-count validation done before a session starts.

use crate::error::{GameError, GameResult};
use crate::types::{Language, Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum number of named players for a game
pub const MIN_PLAYERS: usize = 3;

/// Everything gathered on the setup screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSetup {
    pub players: Vec<Player>,
    pub imposter_count: usize,
    #[serde(default)]
    pub language: Language,
}

impl GameSetup {
    /// Build a setup from bare names, numbering players in order
    pub fn from_names<I, S>(names: I, imposter_count: usize, language: Language) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();

        Self {
            players,
            imposter_count,
            language,
        }
    }

    /// Drop blank names, trim the rest and check the game can be played
    pub fn validated(self) -> GameResult<Self> {
        let players: Vec<Player> = self
            .players
            .into_iter()
            .filter_map(|p| {
                let name = p.name.trim();
                (!name.is_empty()).then(|| Player::new(p.id, name))
            })
            .collect();

        if players.len() < MIN_PLAYERS {
            return Err(GameError::InvalidConfiguration(format!(
                "Please enter at least {} player names",
                MIN_PLAYERS
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = players.iter().find(|p| !seen.insert(p.id)) {
            return Err(GameError::InvalidConfiguration(format!(
                "Duplicate player id {}",
                dup.id
            )));
        }

        crate::assign::validate(players.len(), self.imposter_count)?;

        Ok(Self {
            players,
            imposter_count: self.imposter_count,
            language: self.language,
        })
    }
}

/// Id for a player added to `players`: one past the highest id, 0 when empty
pub fn next_player_id(players: &[Player]) -> PlayerId {
    players.iter().map(|p| p.id + 1).max().unwrap_or(0)
}

/// Imposter counts offered for a roster of `player_count`
pub fn imposter_options(player_count: usize) -> std::ops::RangeInclusive<usize> {
    let max = (player_count / 2).saturating_sub(1).max(1);
    1..=max
}
