//! Verification API
//!
//! After the issuer reveals the server seed, anyone can:
//! 1. Check `SHA-256(seed)` against the commitment published beforehand.
//! 2. Recompute each round's digest and outcome and compare with what was shown.
//!
//! A mismatch is an expected result of auditing, so the checks return
//! `bool` / reports rather than errors.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use super::commitment::Commitment;
use super::deriver::{derive_outcome, DerivedDigest};
use super::outcome::Outcome;
use super::seed::{ClientSeed, Nonce, ServerSeed};
use super::session::RoundRecord;

/// Recompute the commitment of `secret` and compare with `expected`.
///
/// Never fails: an empty secret simply does not verify.
pub fn verify(secret: &str, expected: &Commitment) -> bool {
    match ServerSeed::new(secret) {
        Ok(seed) => expected.matches(&seed),
        Err(_) => false,
    }
}

/// Like [`verify`], taking the expected commitment as hex text.
///
/// Malformed hex does not verify.
pub fn verify_hex(secret: &str, expected_hex: &str) -> bool {
    match expected_hex.parse::<Commitment>() {
        Ok(expected) => verify(secret, &expected),
        Err(_) => false,
    }
}

/// Why an audit failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AuditError {
    /// Revealed seed does not hash to the published commitment.
    #[error("server seed does not match commitment {expected}")]
    CommitmentMismatch {
        /// Commitment published before play.
        expected: Commitment,
        /// Commitment of the revealed seed.
        computed: Commitment,
    },

    /// Recorded digest differs from the recomputed one.
    #[error("digest mismatch at nonce {nonce}")]
    DigestMismatch {
        /// Round nonce.
        nonce: Nonce,
        /// Digest shown during play.
        recorded: DerivedDigest,
        /// Digest recomputed from the revealed seed.
        computed: DerivedDigest,
    },

    /// Recorded outcome differs from the recomputed one.
    #[error("outcome mismatch at nonce {nonce}: recorded {recorded}, computed {computed}")]
    OutcomeMismatch {
        /// Round nonce.
        nonce: Nonce,
        /// Outcome shown during play.
        recorded: Outcome,
        /// Outcome recomputed from the revealed seed.
        computed: Outcome,
    },

    /// Rounds skip or repeat a nonce.
    #[error("nonce gap: expected {expected}, found {found}")]
    NonceGap {
        /// Next nonce expected.
        expected: Nonce,
        /// Nonce found in the record.
        found: Nonce,
    },

    /// Recorded spec cannot be replayed.
    #[error("round at nonce {nonce} cannot be replayed: {reason}")]
    Unreplayable {
        /// Round nonce.
        nonce: Nonce,
        /// Underlying error text.
        reason: String,
    },
}

/// Result of auditing one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundAudit {
    /// Round nonce.
    pub nonce: Nonce,
    /// Did the round replay identically?
    pub valid: bool,
    /// Recomputed digest (absent when the spec was invalid).
    pub computed_digest: Option<DerivedDigest>,
}

/// Full audit of a revealed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Did every check pass?
    pub valid: bool,
    /// Commitment of the revealed seed.
    pub computed_commitment: Commitment,
    /// Commitment published before play.
    pub expected_commitment: Commitment,
    /// Per-round results.
    pub rounds: Vec<RoundAudit>,
    /// Every failure found, in order.
    pub errors: Vec<AuditError>,
}

impl AuditReport {
    /// First failure, if any.
    pub fn first_error(&self) -> Option<&AuditError> {
        self.errors.first()
    }

    /// Convert into a `Result`, failing with the first error.
    pub fn into_result(self) -> Result<(), AuditError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Replay one recorded round.
pub fn audit_round(
    server_seed: &ServerSeed,
    client_seed: &ClientSeed,
    record: &RoundRecord,
) -> Result<DerivedDigest, AuditError> {
    let replay = derive_outcome(server_seed, client_seed, record.nonce, &record.spec).map_err(|e| {
        AuditError::Unreplayable {
            nonce: record.nonce,
            reason: e.to_string(),
        }
    })?;

    if replay.digest != record.digest {
        return Err(AuditError::DigestMismatch {
            nonce: record.nonce,
            recorded: record.digest,
            computed: replay.digest,
        });
    }
    if replay.outcome != record.outcome {
        return Err(AuditError::OutcomeMismatch {
            nonce: record.nonce,
            recorded: record.outcome.clone(),
            computed: replay.outcome,
        });
    }
    Ok(replay.digest)
}

/// Audit a full reveal: commitment, nonce sequence and every round.
///
/// Rounds must start at `first_nonce` and advance by exactly 1.
pub fn audit_rounds(
    expected: &Commitment,
    server_seed: &ServerSeed,
    client_seed: &ClientSeed,
    first_nonce: Nonce,
    rounds: &[RoundRecord],
) -> AuditReport {
    let computed_commitment = Commitment::new(server_seed);
    let mut errors = Vec::new();

    if !expected.matches(server_seed) {
        errors.push(AuditError::CommitmentMismatch {
            expected: *expected,
            computed: computed_commitment,
        });
    }

    let mut next = first_nonce;
    let mut round_audits = Vec::with_capacity(rounds.len());
    for record in rounds {
        if record.nonce != next {
            errors.push(AuditError::NonceGap {
                expected: next,
                found: record.nonce,
            });
        }
        next = record.nonce.next();

        let (valid, computed_digest) = match audit_round(server_seed, client_seed, record) {
            Ok(digest) => (true, Some(digest)),
            Err(err) => {
                let digest = match &err {
                    AuditError::DigestMismatch { computed, .. } => Some(*computed),
                    AuditError::OutcomeMismatch { .. } => Some(record.digest),
                    _ => None,
                };
                errors.push(err);
                (false, digest)
            }
        };
        round_audits.push(RoundAudit {
            nonce: record.nonce,
            valid,
            computed_digest,
        });
    }

    AuditReport {
        valid: errors.is_empty(),
        computed_commitment,
        expected_commitment: *expected,
        rounds: round_audits,
        errors,
    }
}
