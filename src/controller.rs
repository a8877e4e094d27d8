//! The single active game flow: setup -> word selection -> reveal -> discussion.
//!
//! At most one start may be in flight. A start can be cancelled while its word
//! fetch is outstanding; a cancelled or abandoned start persists nothing.

use crate::config::AppConfig;
use crate::error::{GameError, GameResult};
use crate::history::WordHistoryStore;
use crate::reveal::RevealSession;
use crate::session::{DefaultsStore, GameSession, GameSessionStore, SavedDefaults};
use crate::setup::GameSetup;
use crate::store::{KeyValueStore, StoreResult};
use crate::types::*;
use crate::words::{self, WordSource, DEFAULT_MAX_ATTEMPTS};
use futures::future::{AbortHandle, Abortable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, RwLock};

/// Tunables for a controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub max_attempts: usize,
    pub seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }
}

impl From<&AppConfig> for ControllerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            seed: config.seed,
        }
    }
}

/// What the device shows right now. Never contains the word or the imposter
/// set, except the current player's card while it is visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub session_id: SessionId,
    pub reveal: RevealState,
    pub language: Language,
    pub player_count: usize,
    pub imposter_count: usize,
    pub current_player: Option<Player>,
    pub card: Option<RoleCard>,
}

impl From<&RevealSession> for SessionView {
    fn from(reveal: &RevealSession) -> Self {
        let session = reveal.session();
        Self {
            session_id: session.id.clone(),
            reveal: reveal.state(),
            language: session.language,
            player_count: session.roster.len(),
            imposter_count: session.imposter_count,
            current_player: reveal.current_player().cloned(),
            card: reveal.current_card(),
        }
    }
}

/// Result of a successful start
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartReport {
    pub session: SessionView,
    pub word_origin: WordOrigin,
    /// Shown to the group when the fallback list had to be used
    pub advisory: Option<String>,
}

struct PendingStart {
    ticket: u64,
    handle: AbortHandle,
    /// Past the point of no return; no longer cancellable
    committed: bool,
}

/// Clears the pending slot when a start finishes or its future is dropped
struct PendingGuard<'a> {
    slot: &'a StdMutex<Option<PendingStart>>,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.as_ref().is_some_and(|p| p.ticket == self.ticket) {
            *pending = None;
        }
    }
}

pub struct GameController {
    sessions: GameSessionStore,
    history: WordHistoryStore,
    defaults: DefaultsStore,
    word_source: Arc<dyn WordSource>,
    max_attempts: usize,
    rng: Mutex<StdRng>,
    active: RwLock<Option<RevealSession>>,
    pending: StdMutex<Option<PendingStart>>,
    next_ticket: AtomicU64,
}

impl GameController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        word_source: Arc<dyn WordSource>,
        options: ControllerOptions,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            sessions: GameSessionStore::new(store.clone()),
            history: WordHistoryStore::new(store.clone()),
            defaults: DefaultsStore::new(store),
            word_source,
            max_attempts: options.max_attempts,
            rng: Mutex::new(rng),
            active: RwLock::new(None),
            pending: StdMutex::new(None),
            next_ticket: AtomicU64::new(1),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingStart>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register_start(&self, handle: AbortHandle) -> GameResult<PendingGuard<'_>> {
        let mut pending = self.pending();
        if pending.is_some() {
            return Err(GameError::StartInFlight);
        }
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        *pending = Some(PendingStart {
            ticket,
            handle,
            committed: false,
        });
        Ok(PendingGuard {
            slot: &self.pending,
            ticket,
        })
    }

    /// Mark our pending entry committed; `false` means the start was cancelled.
    /// The entry stays in place until the guard drops.
    fn commit_start(&self, ticket: u64) -> bool {
        match self.pending().as_mut() {
            Some(p) if p.ticket == ticket => {
                p.committed = true;
                true
            }
            _ => false,
        }
    }

    /// Whether a start is waiting on its word or still persisting
    pub fn start_in_flight(&self) -> bool {
        self.pending().is_some()
    }

    /// Start a new game, replacing any active session
    pub async fn start_game(&self, setup: GameSetup) -> GameResult<StartReport> {
        let setup = setup.validated()?;

        let (handle, registration) = AbortHandle::new_pair();
        let guard = self.register_start(handle)?;

        let history = self.history.load().await;
        let fetch = words::select_word(
            setup.language,
            &history,
            self.word_source.as_ref(),
            self.max_attempts,
        );

        let (word, word_origin) = match Abortable::new(fetch, registration).await {
            Err(_aborted) => {
                tracing::info!("Game start cancelled while fetching a word");
                return Err(GameError::StartCancelled);
            }
            Ok(Ok(word)) => (word, WordOrigin::Source),
            Ok(Err(GameError::WordSourceUnavailable(reason))) => {
                let mut rng = self.rng.lock().await;
                let word = words::fallback_word(setup.language, &history, &mut *rng);
                tracing::warn!("Using built-in word list ({})", reason);
                (word.to_string(), WordOrigin::Fallback)
            }
            Ok(Err(e)) => return Err(e),
        };

        let reveal = {
            let mut rng = self.rng.lock().await;
            RevealSession::new(GameSession::create(setup.clone(), word, &mut *rng)?)?
        };

        // Persist and install under the session lock; the start slot stays
        // taken until the guard drops at the end
        let mut active = self.active.write().await;
        if !self.commit_start(guard.ticket) {
            tracing::info!("Discarding word for cancelled game start");
            return Err(GameError::StartCancelled);
        }

        let session = reveal.session();
        self.history.record(&session.word).await;
        if let Err(e) = self.sessions.save(session).await {
            tracing::warn!("Failed to persist session {}: {}", session.id, e);
        }
        if let Err(e) = self.defaults.save(&setup).await {
            tracing::warn!("Failed to save setup defaults: {}", e);
        }

        tracing::info!(
            "Started session {} with {} players, {} imposter(s), language {}",
            session.id,
            session.roster.len(),
            session.imposter_count,
            session.language
        );

        let view = SessionView::from(&reveal);
        *active = Some(reveal);
        drop(active);
        drop(guard);

        let advisory = (word_origin == WordOrigin::Fallback).then(|| {
            "Word service unavailable, the word was taken from the built-in list".to_string()
        });

        Ok(StartReport {
            session: view,
            word_origin,
            advisory,
        })
    }

    /// Abort an in-flight start. Returns whether one was cancelled; a start
    /// that is already persisting runs to completion.
    pub fn cancel_start(&self) -> bool {
        let mut pending = self.pending();
        if !pending.as_ref().is_some_and(|p| !p.committed) {
            return false;
        }
        if let Some(p) = pending.take() {
            p.handle.abort();
        }
        true
    }

    /// Current session, reloading it from storage if needed.
    ///
    /// `NoActiveSession` means the caller should go back to setup.
    pub async fn resume(&self) -> GameResult<SessionView> {
        if let Some(reveal) = self.active.read().await.as_ref() {
            return Ok(SessionView::from(reveal));
        }

        let mut active = self.active.write().await;
        if let Some(reveal) = active.as_ref() {
            return Ok(SessionView::from(reveal));
        }

        let record = self
            .sessions
            .load()
            .await
            .ok_or(GameError::NoActiveSession)?;

        let restored = {
            let mut rng = self.rng.lock().await;
            record
                .into_session(&mut *rng)
                .and_then(|(session, assigned)| Ok((RevealSession::new(session)?, assigned)))
        };

        let (reveal, assigned) = match restored {
            Ok(restored) => restored,
            Err(e) => {
                tracing::warn!("Stored session cannot be resumed, clearing it: {}", e);
                if let Err(e) = self.sessions.clear().await {
                    tracing::error!("Failed to clear stored session: {}", e);
                }
                return Err(GameError::NoActiveSession);
            }
        };

        if assigned {
            if let Err(e) = self
                .sessions
                .save_imposters(&reveal.session().imposters)
                .await
            {
                tracing::warn!("Failed to persist imposter assignment: {}", e);
            }
        }

        tracing::info!("Resumed session {}", reveal.session().id);
        let view = SessionView::from(&reveal);
        *active = Some(reveal);
        Ok(view)
    }

    async fn drive<F>(&self, step: F) -> GameResult<SessionView>
    where
        F: FnOnce(&mut RevealSession) -> GameResult<RevealState>,
    {
        self.resume().await?;
        let mut active = self.active.write().await;
        let reveal = active.as_mut().ok_or(GameError::NoActiveSession)?;
        step(reveal)?;
        Ok(SessionView::from(&*reveal))
    }

    /// Hand the device to the first player
    pub async fn begin(&self) -> GameResult<SessionView> {
        self.drive(RevealSession::start).await
    }

    pub async fn reveal(&self) -> GameResult<SessionView> {
        self.drive(RevealSession::reveal).await
    }

    pub async fn advance(&self) -> GameResult<SessionView> {
        self.drive(RevealSession::advance).await
    }

    /// Back to the start of the reveal sequence with the same assignment.
    /// Rejected once every player has seen their role.
    pub async fn restart(&self) -> GameResult<SessionView> {
        self.drive(RevealSession::restart).await
    }

    pub async fn is_imposter(&self, index: usize) -> GameResult<bool> {
        self.resume().await?;
        let active = self.active.read().await;
        active
            .as_ref()
            .ok_or(GameError::NoActiveSession)?
            .is_imposter(index)
    }

    /// Destroy the session and return to setup
    pub async fn reset(&self) -> StoreResult<()> {
        self.cancel_start();
        let mut active = self.active.write().await;
        if let Some(reveal) = active.take() {
            tracing::info!("Reset session {}", reveal.session().id);
        }
        self.sessions.clear().await
    }

    pub async fn saved_defaults(&self) -> SavedDefaults {
        self.defaults.load().await
    }

    pub async fn history_len(&self) -> usize {
        self.history.len().await
    }

    pub async fn clear_history(&self) -> StoreResult<()> {
        tracing::info!("Clearing word history");
        self.history.clear().await
    }
}
