//! Deck shuffling: balanced letter layouts for a round.

use rand::Rng;
use rand::seq::SliceRandom;

/// Symbols available to a round, in the order they are handed out.
pub const SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const MIN_PAIRS: usize = 5;
pub const MAX_PAIRS: usize = SYMBOLS.len();

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pair count {requested} is out of range, expected {min}..={max}")]
    PairCountOutOfRange { requested: usize, min: usize, max: usize },
}

/// Checks that `pair_count` can be dealt from [`SYMBOLS`].
pub fn validate_pair_count(pair_count: usize) -> Result<(), ValidationError> {
    if (MIN_PAIRS..=MAX_PAIRS).contains(&pair_count) {
        Ok(())
    } else {
        Err(ValidationError::PairCountOutOfRange {
            requested: pair_count,
            min: MIN_PAIRS,
            max: MAX_PAIRS,
        })
    }
}

/// Two copies of the first `pair_count` symbols, uniformly permuted.
///
/// `SliceRandom::shuffle` walks from the last index down to 1 and swaps each
/// slot with a uniformly drawn index at or below it (Fisher-Yates), so a
/// seeded `rng` yields a reproducible deck.
pub fn shuffle<R: Rng + ?Sized>(pair_count: usize, rng: &mut R) -> Result<Vec<char>, ValidationError> {
    validate_pair_count(pair_count)?;
    let mut deck: Vec<char> = SYMBOLS.chars().take(pair_count).collect();
    deck.extend_from_within(..);
    deck.shuffle(rng);
    Ok(deck)
}
