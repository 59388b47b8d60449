//! OS-Backed Entropy
//!
//! Non-deterministic randomness for the parts that must not be replayable:
//! fresh server/client seeds and the "secure random" number stream.
//! Everything else in the crate is deterministic.

use rand::rngs::OsRng;
use rand::Rng;
use thiserror::Error;

/// Alphabet for generated seed suffixes (lowercase base-36).
const SEED_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended to generated seeds.
pub const SEED_SUFFIX_LEN: usize = 13;

/// Prefix for generated server seeds.
pub const SERVER_SEED_PREFIX: &str = "casino_server_secret_";

/// Prefix for generated client seeds.
pub const CLIENT_SEED_PREFIX: &str = "player_";

/// Entropy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// Lower bound above upper bound.
    #[error("inverted range: min {min} > max {max}")]
    InvertedRange {
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
}

/// Draw a random base-36 token of `len` characters.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

/// Generate a fresh server seed from the OS RNG.
pub fn generate_server_seed_string() -> String {
    format!("{}{}", SERVER_SEED_PREFIX, random_token(&mut OsRng, SEED_SUFFIX_LEN))
}

/// Generate a fresh client seed from the OS RNG.
pub fn generate_client_seed_string() -> String {
    format!("{}{}", CLIENT_SEED_PREFIX, random_token(&mut OsRng, SEED_SUFFIX_LEN))
}

/// Uniform integer in `[min, max]` from the OS RNG.
///
/// `gen_range` rejects out-of-zone draws, so there is no modulo bias for
/// ranges that do not divide the sample space. `min == max` yields `min`.
pub fn secure_int_range(min: i64, max: i64) -> Result<i64, EntropyError> {
    secure_int_range_with(&mut OsRng, min, max)
}

/// Same as [`secure_int_range`] with a caller-supplied RNG.
pub fn secure_int_range_with<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> Result<i64, EntropyError> {
    if min > max {
        return Err(EntropyError::InvertedRange { min, max });
    }
    Ok(rng.gen_range(min..=max))
}
