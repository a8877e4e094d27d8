//! Imposter selection.
//!
//! Indices are drawn with a Fisher-Yates shuffle (`SliceRandom::shuffle`), so
//! every roster position has the same chance of being an imposter. Sorting
//! with a random comparator is biased and must not be used here.

use crate::error::{GameError, GameResult};
use crate::types::ImposterSet;
use rand::seq::SliceRandom;
use rand::Rng;

/// Check `roster_size >= 2` and `1 <= imposter_count < roster_size`
pub fn validate(roster_size: usize, imposter_count: usize) -> GameResult<()> {
    if roster_size < 2 {
        return Err(GameError::InvalidConfiguration(format!(
            "Roster needs at least 2 players, got {}",
            roster_size
        )));
    }
    if imposter_count == 0 {
        return Err(GameError::InvalidConfiguration(
            "There must be at least one imposter".to_string(),
        ));
    }
    if imposter_count >= roster_size {
        return Err(GameError::InvalidConfiguration(format!(
            "There must be fewer imposters ({}) than players ({})",
            imposter_count, roster_size
        )));
    }
    Ok(())
}

/// Pick `imposter_count` distinct roster indices uniformly at random
pub fn assign<R: Rng + ?Sized>(
    roster_size: usize,
    imposter_count: usize,
    rng: &mut R,
) -> GameResult<ImposterSet> {
    validate(roster_size, imposter_count)?;

    let mut indices: Vec<usize> = (0..roster_size).collect();
    indices.shuffle(rng);

    Ok(indices.into_iter().take(imposter_count).collect())
}
