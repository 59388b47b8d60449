//! Server Seed Commitment
//!
//! Commit to the server seed before any outcome is produced.
//! Reveal the seed afterwards and anyone can check `SHA-256(seed)` against
//! the published commitment.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize, Serializer, Deserializer};

use crate::core::hash::{self, Digest32};
use super::error::{FairError, FairResult};
use super::seed::ServerSeed;

/// Commitment = SHA-256(server seed UTF-8 bytes).
///
/// Serializes as a lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(Digest32);

impl Commitment {
    /// Commit to a validated server seed.
    pub fn new(seed: &ServerSeed) -> Self {
        Self(hash::hash_bytes(seed.as_bytes()))
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: Digest32) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &Digest32 {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hash::to_hex(&self.0)
    }

    /// Check that `seed` hashes to this commitment.
    pub fn matches(&self, seed: &ServerSeed) -> bool {
        hash::digests_equal(&self.0, &Self::new(seed).0)
    }
}

/// Commit to a raw secret string.
///
/// Fails only when the secret is empty.
pub fn commit(secret: &str) -> FairResult<Commitment> {
    let seed = ServerSeed::new(secret)?;
    Ok(Commitment::new(&seed))
}

impl FromStr for Commitment {
    type Err = FairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hash::from_hex(s.trim())
            .map(Self)
            .ok_or_else(|| FairError::MalformedCommitment(s.to_string()))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(d)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_COMMITMENT: &str =
        "4e738ca5563c06cfd0018299933d58db1dd8bf97f6973dc99bf6cdc64b5550bd";

    #[test]
    fn test_commitment_golden_value() {
        let commitment = commit("s3cr3t").unwrap();
        assert_eq!(commitment.to_hex(), GOLDEN_COMMITMENT);
        assert_eq!(commitment.to_string(), GOLDEN_COMMITMENT);
    }

    #[test]
    fn test_commitment_determinism() {
        assert_eq!(commit("seed-a").unwrap(), commit("seed-a").unwrap());
    }

    #[test]
    fn test_different_seeds_different_commitments() {
        assert_ne!(commit("seed-a").unwrap(), commit("seed-b").unwrap());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(commit(""), Err(FairError::EmptyServerSeed));
    }

    #[test]
    fn test_matches() {
        let seed = ServerSeed::new("casino_server_secret_abc").unwrap();
        let commitment = Commitment::new(&seed);
        assert!(commitment.matches(&seed));

        let other = ServerSeed::new("casino_server_secret_abd").unwrap();
        assert!(!commitment.matches(&other));
    }

    #[test]
    fn test_parse_commitment() {
        let parsed: Commitment = GOLDEN_COMMITMENT.parse().unwrap();
        assert_eq!(parsed, commit("s3cr3t").unwrap());

        let upper: Commitment = GOLDEN_COMMITMENT.to_uppercase().parse().unwrap();
        assert_eq!(upper, parsed);

        assert!(matches!("xyz".parse::<Commitment>(), Err(FairError::MalformedCommitment(_))));
    }

    #[test]
    fn test_commitment_serde_as_hex() {
        let commitment = commit("s3cr3t").unwrap();
        let json = serde_json::to_string(&commitment).unwrap();
        assert_eq!(json, format!("\"{}\"", GOLDEN_COMMITMENT));

        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commitment);
    }
}
