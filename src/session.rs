//! Session data and its persistence.
//!
//! A session is written as separate keys (`players`, `imposterCount`, `word`,
//! `language`, plus `imposters` and `sessionId`) so a reload can resume the
//! reveal flow. `sessionId` is removed first and written last, so a save
//! that fails part-way reads back as no session rather than a mix of two.
//! Setup defaults live under their own `saved*` keys with an independent
//! lifecycle.

use crate::error::{GameError, GameResult};
use crate::setup::{GameSetup, MIN_PLAYERS};
use crate::store::{KeyValueStore, StoreResult};
use crate::types::{ImposterSet, Language, Player, SessionId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const PLAYERS_KEY: &str = "players";
pub const IMPOSTER_COUNT_KEY: &str = "imposterCount";
pub const WORD_KEY: &str = "word";
pub const LANGUAGE_KEY: &str = "language";
pub const IMPOSTERS_KEY: &str = "imposters";
pub const SESSION_ID_KEY: &str = "sessionId";

pub const SAVED_PLAYERS_KEY: &str = "savedPlayers";
pub const SAVED_IMPOSTER_COUNT_KEY: &str = "savedImposterCount";
pub const SAVED_LANGUAGE_KEY: &str = "savedLanguage";

const SESSION_KEYS: &[&str] = &[
    SESSION_ID_KEY,
    PLAYERS_KEY,
    IMPOSTER_COUNT_KEY,
    WORD_KEY,
    LANGUAGE_KEY,
    IMPOSTERS_KEY,
];

/// One pass-the-device cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    pub id: SessionId,
    pub roster: Vec<Player>,
    pub imposter_count: usize,
    pub word: String,
    pub language: Language,
    pub imposters: ImposterSet,
}

impl GameSession {
    /// Create a session from a setup, assigning imposters with `rng`
    pub fn create<R: Rng + ?Sized>(setup: GameSetup, word: String, rng: &mut R) -> GameResult<Self> {
        let setup = setup.validated()?;
        let imposters = crate::assign::assign(setup.players.len(), setup.imposter_count, rng)?;

        Ok(Self {
            id: ulid::Ulid::new().to_string(),
            roster: setup.players,
            imposter_count: setup.imposter_count,
            word,
            language: setup.language,
            imposters,
        })
    }

    /// Check the roster, imposter count and imposter set agree
    pub fn check(&self) -> GameResult<()> {
        crate::assign::validate(self.roster.len(), self.imposter_count)?;
        if !self.imposters.fits(self.roster.len(), self.imposter_count) {
            return Err(GameError::InvalidConfiguration(format!(
                "Imposter set {:?} does not fit a roster of {} with {} imposters",
                self.imposters.iter().collect::<Vec<_>>(),
                self.roster.len(),
                self.imposter_count
            )));
        }
        Ok(())
    }
}

/// Session inputs as read back from storage.
///
/// `imposters` is `None` when the stored set was missing or did not match the
/// roster; it then has to be assigned once and written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub roster: Vec<Player>,
    pub imposter_count: usize,
    pub word: String,
    pub language: Language,
    pub imposters: Option<ImposterSet>,
}

impl SessionRecord {
    /// Turn the record into a session, assigning imposters if none were stored.
    /// The flag reports whether an assignment was made.
    pub fn into_session<R: Rng + ?Sized>(self, rng: &mut R) -> GameResult<(GameSession, bool)> {
        let (imposters, assigned) = match self.imposters {
            Some(set) => (set, false),
            None => (
                crate::assign::assign(self.roster.len(), self.imposter_count, rng)?,
                true,
            ),
        };

        let session = GameSession {
            id: self.id,
            roster: self.roster,
            imposter_count: self.imposter_count,
            word: self.word,
            language: self.language,
            imposters,
        };
        session.check()?;
        Ok((session, assigned))
    }
}

pub struct GameSessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl GameSessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, session: &GameSession) -> StoreResult<()> {
        self.store.remove(SESSION_ID_KEY).await?;
        self.store
            .set(PLAYERS_KEY, &serde_json::to_string(&session.roster)?, None)
            .await?;
        self.store
            .set(IMPOSTER_COUNT_KEY, &session.imposter_count.to_string(), None)
            .await?;
        self.store.set(WORD_KEY, &session.word, None).await?;
        self.store
            .set(LANGUAGE_KEY, session.language.as_str(), None)
            .await?;
        self.save_imposters(&session.imposters).await?;
        self.store.set(SESSION_ID_KEY, &session.id, None).await
    }

    pub async fn save_imposters(&self, imposters: &ImposterSet) -> StoreResult<()> {
        self.store
            .set(IMPOSTERS_KEY, &serde_json::to_string(imposters)?, None)
            .await
    }

    /// Read the stored session.
    ///
    /// Any missing or corrupt required field means "no session" and the
    /// caller should return to setup.
    pub async fn load(&self) -> Option<SessionRecord> {
        match self.try_load().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Stored session is unusable, returning to setup: {}", e);
                None
            }
        }
    }

    async fn try_load(&self) -> GameResult<Option<SessionRecord>> {
        let id = self
            .store
            .get(SESSION_ID_KEY)
            .await?
            .filter(|id| !id.trim().is_empty());
        let players = self.store.get(PLAYERS_KEY).await?;
        let count = self.store.get(IMPOSTER_COUNT_KEY).await?;
        let word = self.store.get(WORD_KEY).await?;

        let (Some(players), Some(count), Some(word)) = (players, count, word) else {
            return Ok(None);
        };
        let Some(id) = id else {
            tracing::warn!("Stored session has no id, treating it as an unfinished write");
            return Ok(None);
        };

        let roster: Vec<Player> = serde_json::from_str(&players)
            .map_err(|e| GameError::CorruptPersistedState(format!("players: {}", e)))?;
        if roster.len() < MIN_PLAYERS || roster.iter().any(|p| p.name.trim().is_empty()) {
            return Err(GameError::CorruptPersistedState(format!(
                "players: need {} named players, found {}",
                MIN_PLAYERS,
                roster.len()
            )));
        }

        let imposter_count: usize = count.trim().parse().map_err(|_| {
            GameError::CorruptPersistedState(format!("imposterCount: {:?} is not a number", count))
        })?;
        crate::assign::validate(roster.len(), imposter_count)
            .map_err(|e| GameError::CorruptPersistedState(e.to_string()))?;

        if word.trim().is_empty() {
            return Err(GameError::CorruptPersistedState("word is empty".to_string()));
        }

        let language = match self.store.get(LANGUAGE_KEY).await? {
            None => Language::default(),
            Some(raw) => Language::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown stored language {:?}, using default", raw);
                Language::default()
            }),
        };

        let imposters = self
            .store
            .get(IMPOSTERS_KEY)
            .await?
            .and_then(|raw| serde_json::from_str::<ImposterSet>(&raw).ok())
            .filter(|set| set.fits(roster.len(), imposter_count));

        Ok(Some(SessionRecord {
            id,
            roster,
            imposter_count,
            word,
            language,
            imposters,
        }))
    }

    pub async fn clear(&self) -> StoreResult<()> {
        for key in SESSION_KEYS {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}

/// Setup screen defaults remembered from the last started game
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedDefaults {
    pub players: Option<Vec<Player>>,
    pub imposter_count: Option<usize>,
    pub language: Option<Language>,
}

pub struct DefaultsStore {
    store: Arc<dyn KeyValueStore>,
}

impl DefaultsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, setup: &GameSetup) -> StoreResult<()> {
        self.store
            .set(SAVED_PLAYERS_KEY, &serde_json::to_string(&setup.players)?, None)
            .await?;
        self.store
            .set(
                SAVED_IMPOSTER_COUNT_KEY,
                &setup.imposter_count.to_string(),
                None,
            )
            .await?;
        self.store
            .set(SAVED_LANGUAGE_KEY, setup.language.as_str(), None)
            .await
    }

    /// Each field is read on its own; unreadable fields come back as `None`
    pub async fn load(&self) -> SavedDefaults {
        SavedDefaults {
            players: self
                .read(SAVED_PLAYERS_KEY)
                .await
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            imposter_count: self
                .read(SAVED_IMPOSTER_COUNT_KEY)
                .await
                .and_then(|raw| raw.trim().parse().ok()),
            language: self
                .read(SAVED_LANGUAGE_KEY)
                .await
                .and_then(|raw| Language::parse(&raw)),
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read {}: {}", key, e);
            None
        })
    }
}
