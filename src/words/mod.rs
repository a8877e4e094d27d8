mod builtin;
mod generator;
mod http;

use crate::error::{GameError, GameResult};
use crate::types::Language;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::time::Duration;

pub use builtin::{builtin_words, StaticWordSource};
pub use generator::PetnameWordSource;
pub use http::HttpWordSource;

/// Default number of candidates requested before accepting a repeat
pub const DEFAULT_MAX_ATTEMPTS: usize = 20;

/// Result type for word source operations
pub type WordResult<T> = Result<T, WordSourceError>;

/// Errors a word source can report
#[derive(Debug, thiserror::Error)]
pub enum WordSourceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Language {0} is not supported by this source")]
    Unsupported(Language),

    #[error("Response parsing failed: {0}")]
    Parse(String),

    #[error("Source returned no word")]
    Empty,
}

/// Capability producing a random candidate noun for a language
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn fetch_word(&self, language: Language) -> WordResult<String>;

    /// Name of this source, for logging
    fn name(&self) -> &str;
}

/// Ask `source` for a word that does not appear in `history`.
///
/// Makes at most `max_attempts` calls (at least one). The first candidate not
/// in history wins; if every candidate was already used, the last one is
/// returned anyway. A failing source aborts with `WordSourceUnavailable`.
/// Recording the result into history is the caller's job.
pub async fn select_word(
    language: Language,
    history: &[String],
    source: &dyn WordSource,
    max_attempts: usize,
) -> GameResult<String> {
    let attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let candidate = source.fetch_word(language).await.map_err(|e| {
            tracing::warn!("Word source {} failed: {}", source.name(), e);
            GameError::WordSourceUnavailable(e.to_string())
        })?;

        if !history.iter().any(|used| *used == candidate) {
            tracing::debug!("Picked word on attempt {}/{}", attempt, attempts);
            return Ok(candidate);
        }

        if attempt >= attempts {
            tracing::warn!(
                "No unused word after {} attempts from {}, accepting a repeat",
                attempts,
                source.name()
            );
            return Ok(candidate);
        }
        attempt += 1;
    }
}

/// Pick from the built-in list, preferring words not in `history`.
///
/// Once every built-in word has been used the full list is eligible again.
pub fn fallback_word<R: Rng + ?Sized>(
    language: Language,
    history: &[String],
    rng: &mut R,
) -> &'static str {
    let words = builtin_words(language);
    let fresh: Vec<&'static str> = words
        .iter()
        .copied()
        .filter(|w| !history.iter().any(|used| used == w))
        .collect();

    let pool = if fresh.is_empty() { words } else { &fresh[..] };
    pool.choose(rng).copied().unwrap_or(words[0])
}
