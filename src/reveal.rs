//! Pass-the-device reveal sequence.
//!
//! ```text
//! NotStarted --start--> ShowingPlayer(0) --reveal--> AwaitingReveal(0) --advance--> ShowingPlayer(1) ...
//! AwaitingReveal(last) --advance--> Finished
//! ```
//!
//! Players are visited in roster order, each exactly once. The imposter set is
//! taken from the session at construction and never recomputed, so restarting
//! the sequence shows every player the same role again.

use crate::error::{GameError, GameResult};
use crate::session::GameSession;
use crate::types::{Player, RevealState, RoleCard};

#[derive(Debug, Clone)]
pub struct RevealSession {
    session: GameSession,
    state: RevealState,
}

impl RevealSession {
    pub fn new(session: GameSession) -> GameResult<Self> {
        session.check()?;
        Ok(Self {
            session,
            state: RevealState::NotStarted,
        })
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn roster(&self) -> &[Player] {
        &self.session.roster
    }

    pub fn is_finished(&self) -> bool {
        self.state == RevealState::Finished
    }

    /// Hand the device to the first player
    pub fn start(&mut self) -> GameResult<RevealState> {
        match self.state {
            RevealState::NotStarted => self.enter(RevealState::ShowingPlayer(0)),
            state => Err(GameError::InvalidTransition {
                state,
                action: "start",
            }),
        }
    }

    /// Make the current player's role visible
    pub fn reveal(&mut self) -> GameResult<RevealState> {
        match self.state {
            RevealState::ShowingPlayer(i) => self.enter(RevealState::AwaitingReveal(i)),
            state => Err(GameError::InvalidTransition {
                state,
                action: "reveal",
            }),
        }
    }

    /// Hide the role and pass the device on, or finish after the last player
    pub fn advance(&mut self) -> GameResult<RevealState> {
        match self.state {
            RevealState::AwaitingReveal(i) if i + 1 < self.roster().len() => {
                self.enter(RevealState::ShowingPlayer(i + 1))
            }
            RevealState::AwaitingReveal(_) => self.enter(RevealState::Finished),
            state => Err(GameError::InvalidTransition {
                state,
                action: "advance",
            }),
        }
    }

    /// Go back to the start of the sequence, keeping the assignment.
    /// `Finished` is terminal; only a reset leaves it.
    pub fn restart(&mut self) -> GameResult<RevealState> {
        match self.state {
            RevealState::Finished => Err(GameError::InvalidTransition {
                state: RevealState::Finished,
                action: "restart",
            }),
            _ => self.enter(RevealState::NotStarted),
        }
    }

    fn enter(&mut self, next: RevealState) -> GameResult<RevealState> {
        tracing::debug!("Reveal {} -> {}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// Whether roster position `index` is an imposter; valid in any state
    pub fn is_imposter(&self, index: usize) -> GameResult<bool> {
        let len = self.roster().len();
        if index >= len {
            return Err(GameError::PlayerOutOfRange { index, len });
        }
        Ok(self.session.imposters.contains(index))
    }

    /// Player currently holding the device
    pub fn current_player(&self) -> Option<&Player> {
        match self.state {
            RevealState::ShowingPlayer(i) | RevealState::AwaitingReveal(i) => self.roster().get(i),
            RevealState::NotStarted | RevealState::Finished => None,
        }
    }

    /// Role of the current player, only while it is visible
    pub fn current_card(&self) -> Option<RoleCard> {
        match self.state {
            RevealState::AwaitingReveal(i) => self.role_card(i).ok(),
            _ => None,
        }
    }

    pub fn role_card(&self, index: usize) -> GameResult<RoleCard> {
        Ok(if self.is_imposter(index)? {
            RoleCard::Imposter
        } else {
            RoleCard::Regular {
                word: self.session.word.clone(),
            }
        })
    }
}
