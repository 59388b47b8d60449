//! Deriver errors.

use thiserror::Error;

/// Invalid-argument conditions reported by the fair deriver.
///
/// Verification mismatches are not errors; see [`crate::fair::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FairError {
    /// Server seed was empty.
    #[error("server seed must not be empty")]
    EmptyServerSeed,

    /// Client seed was empty.
    #[error("client seed must not be empty")]
    EmptyClientSeed,

    /// Counter was negative.
    #[error("nonce must be non-negative, got {0}")]
    NegativeNonce(i64),

    /// Counter text was not a decimal integer.
    #[error("nonce is not a decimal integer: {0:?}")]
    MalformedNonce(String),

    /// Outcome kind name not recognized.
    #[error("unknown outcome kind: {0:?}")]
    UnknownOutcomeKind(String),

    /// Digest hex too short or not hexadecimal.
    #[error("malformed digest: {0:?}")]
    MalformedDigest(String),

    /// Two-decimal number text could not be parsed.
    #[error("malformed number: {0:?}")]
    MalformedNumber(String),

    /// Commitment hex was not 64 hex characters.
    #[error("malformed commitment: {0:?}")]
    MalformedCommitment(String),

    /// Outcome bounds are inverted or too wide.
    #[error("invalid outcome bounds [{min}, {max}]")]
    InvalidBounds {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// Symbol tuple reel count outside 1..=10.
    #[error("reel count must be between 1 and 10, got {0}")]
    InvalidReelCount(u8),

    /// Binary labels must be distinct and non-empty.
    #[error("binary labels must be non-empty and distinct")]
    InvalidBinaryLabels,
}

/// Result alias for deriver operations.
pub type FairResult<T> = Result<T, FairError>;
