//! Fair-Outcome Derivation
//!
//! `digest = HMAC-SHA256(key = server seed, msg = "{client seed}:{nonce}")`
//!
//! The transform is applied once. The server seed is disclosed after use, so
//! speed and auditability matter more than resistance to offline guessing.

use std::fmt;

use serde::{Serialize, Deserialize, Serializer, Deserializer};
use tracing::debug;

use crate::core::hash::{self, Digest32};
use super::error::{FairError, FairResult};
use super::outcome::{self, Outcome, OutcomeSpec};
use super::seed::{ClientSeed, Nonce, ServerSeed};

/// Separator between client seed and nonce in the HMAC message.
pub const INPUT_SEPARATOR: char = ':';

/// HMAC-SHA256 output for one `(server seed, client seed, nonce)` triple.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedDigest(Digest32);

impl DerivedDigest {
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
}

impl fmt::Debug for DerivedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedDigest({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for DerivedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DerivedDigest {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(s)
    }
}

impl<'de> Deserialize<'de> for DerivedDigest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(d)?;
        hash::from_hex(&hex_str)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(FairError::MalformedDigest(hex_str)))
    }
}

/// Everything produced by one derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    /// Nonce used.
    pub nonce: Nonce,
    /// HMAC message, `"{client seed}:{nonce}"`.
    pub combined_input: String,
    /// HMAC-SHA256 digest.
    pub digest: DerivedDigest,
    /// Mapping applied to the digest.
    pub spec: OutcomeSpec,
    /// Game result.
    pub outcome: Outcome,
}

/// Build the HMAC message for a nonce.
pub fn combined_input(client_seed: &ClientSeed, nonce: Nonce) -> String {
    format!("{}{}{}", client_seed.as_str(), INPUT_SEPARATOR, nonce)
}

/// Compute the derived digest. Pure; no outcome mapping.
pub fn derive_digest(server_seed: &ServerSeed, client_seed: &ClientSeed, nonce: Nonce) -> DerivedDigest {
    let message = combined_input(client_seed, nonce);
    DerivedDigest(hash::keyed_digest(server_seed.as_bytes(), message.as_bytes()))
}

/// Derive the digest and map it to an outcome.
pub fn derive_outcome(
    server_seed: &ServerSeed,
    client_seed: &ClientSeed,
    nonce: Nonce,
    spec: &OutcomeSpec,
) -> FairResult<Derivation> {
    spec.validate()?;

    let combined_input = combined_input(client_seed, nonce);
    let digest = DerivedDigest(hash::keyed_digest(server_seed.as_bytes(), combined_input.as_bytes()));
    let outcome = outcome::map_digest(digest.as_bytes(), spec)?;

    debug!(nonce = nonce.value(), kind = %spec.kind(), digest = %digest, outcome = %outcome, "derived outcome");

    Ok(Derivation {
        nonce,
        combined_input,
        digest,
        spec: spec.clone(),
        outcome,
    })
}

/// Derive from raw caller input.
///
/// Fails on an empty secret or public value, a negative counter, or an
/// invalid spec.
pub fn derive(secret: &str, public: &str, counter: i64, spec: &OutcomeSpec) -> FairResult<Derivation> {
    let server_seed = ServerSeed::new(secret)?;
    let client_seed = ClientSeed::new(public)?;
    let nonce = Nonce::try_from(counter)?;
    derive_outcome(&server_seed, &client_seed, nonce, spec)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fair::outcome::OutcomeKind;
    use proptest::prelude::*;

    const GOLDEN_DIGEST: &str =
        "41fd8d36b71b5b6577f0cfa4d203252356946977db26135e4fbce906fa9606c4";

    fn seeds() -> (ServerSeed, ClientSeed) {
        (ServerSeed::new("s3cr3t").unwrap(), ClientSeed::new("abc").unwrap())
    }

    #[test]
    fn test_golden_digest() {
        let derivation = derive("s3cr3t", "abc", 0, &OutcomeSpec::coin()).unwrap();
        assert_eq!(derivation.combined_input, "abc:0");
        assert_eq!(derivation.digest.to_hex(), GOLDEN_DIGEST);
        assert_eq!(derivation.outcome, Outcome::Label("Heads".to_string()));
    }

    #[test]
    fn test_golden_neighbours() {
        let (server, client) = seeds();
        assert_eq!(
            derive_digest(&server, &client, Nonce::new(1)).to_hex(),
            "480f6f69eb0a1406e73e48f0e9d14ec0b88f146c578d3ef503180752fd53ba12"
        );
        assert_eq!(
            derive_digest(&server, &client, Nonce::new(2)).to_hex(),
            "3d9fc201a77a65745a3d4a549df57c49dd94e79bf8fbfb1138f4d136cbc62138"
        );
    }

    #[test]
    fn test_combined_input_format() {
        let client = ClientSeed::new("player42").unwrap();
        assert_eq!(combined_input(&client, Nonce::new(7)), "player42:7");
    }

    #[test]
    fn test_invalid_inputs() {
        let spec = OutcomeSpec::dice();
        assert_eq!(derive("", "abc", 0, &spec), Err(FairError::EmptyServerSeed));
        assert_eq!(derive("s", "", 0, &spec), Err(FairError::EmptyClientSeed));
        assert_eq!(derive("s", "abc", -1, &spec), Err(FairError::NegativeNonce(-1)));
        assert!(matches!(
            derive("s", "abc", 0, &OutcomeSpec::RangedNumber { min: 3, max: 2 }),
            Err(FairError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let (server, client) = seeds();
        let spec = OutcomeSpec::slots();
        let first = derive_outcome(&server, &client, Nonce::new(9), &spec).unwrap();
        let second = derive_outcome(&server, &client, Nonce::new(9), &spec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nonce_reuse_repeats_outcome() {
        let (server, client) = seeds();
        for kind in OutcomeKind::ALL {
            let spec = OutcomeSpec::default_for(kind);
            let a = derive_outcome(&server, &client, Nonce::new(3), &spec).unwrap();
            let b = derive_outcome(&server, &client, Nonce::new(3), &spec).unwrap();
            assert_eq!(a.outcome, b.outcome);
        }
    }

    #[test]
    fn test_distinct_nonces_distinct_digests() {
        let (server, client) = seeds();
        let digests: std::collections::HashSet<_> = (0..1_000)
            .map(|n| derive_digest(&server, &client, Nonce::new(n)))
            .collect();
        assert_eq!(digests.len(), 1_000);
    }

    #[test]
    fn test_ranged_outcomes_within_bounds() {
        let spec = OutcomeSpec::dice();
        for i in 0..10_000u64 {
            let secret = format!("server-{}", i % 97);
            let public = format!("client-{}", i % 89);
            let derivation = derive(&secret, &public, i as i64, &spec).unwrap();
            match derivation.outcome {
                Outcome::Number(n) => {
                    assert!((0..=10_000).contains(&n.raw()));
                    let text = n.to_string();
                    let (_, frac) = text.split_once('.').unwrap();
                    assert_eq!(frac.len(), 2);
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_wheel_outcomes_within_bounds() {
        let (server, client) = seeds();
        let spec = OutcomeSpec::roulette();
        for n in 0..5_000 {
            match derive_outcome(&server, &client, Nonce::new(n), &spec).unwrap().outcome {
                Outcome::Integer(v) => assert!(v <= 36),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn test_binary_frequency_is_balanced() {
        let (server, client) = seeds();
        let spec = OutcomeSpec::coin();
        let trials = 100_000u64;
        let heads = (0..trials)
            .filter(|&n| {
                derive_outcome(&server, &client, Nonce::new(n), &spec).unwrap().outcome
                    == Outcome::Label("Heads".to_string())
            })
            .count() as f64;
        let ratio = heads / trials as f64;
        assert!((0.48..=0.52).contains(&ratio), "heads ratio {}", ratio);
    }

    #[test]
    fn test_derivation_serde() {
        let derivation = derive("s3cr3t", "abc", 0, &OutcomeSpec::dice()).unwrap();
        let json = serde_json::to_value(&derivation).unwrap();
        assert_eq!(json["digest"], GOLDEN_DIGEST);
        assert_eq!(json["combined_input"], "abc:0");
        assert_eq!(json["outcome"]["number"], "50.96");

        let back: Derivation = serde_json::from_value(json).unwrap();
        assert_eq!(back, derivation);
    }

    proptest! {
        #[test]
        fn prop_ranged_within_bounds(
            secret in "[a-z0-9]{1,24}",
            public in "[a-z0-9]{1,24}",
            nonce in 0u64..1_000_000,
            min in -1_000i64..1_000,
            span in 0i64..1_000,
        ) {
            let spec = OutcomeSpec::RangedNumber { min, max: min + span };
            let derivation = derive(&secret, &public, nonce as i64, &spec).unwrap();
            match derivation.outcome {
                Outcome::Number(n) => {
                    prop_assert!(n.raw() >= min * 100);
                    prop_assert!(n.raw() <= (min + span) * 100);
                }
                _ => prop_assert!(false),
            }
        }

        #[test]
        fn prop_bounded_within_bounds(
            secret in "[a-z0-9]{1,24}",
            public in "[a-z0-9]{1,24}",
            nonce in any::<u32>(),
            max in any::<u32>(),
        ) {
            let spec = OutcomeSpec::BoundedInteger { max };
            let derivation = derive(&secret, &public, i64::from(nonce), &spec).unwrap();
            match derivation.outcome {
                Outcome::Integer(v) => prop_assert!(v <= max),
                _ => prop_assert!(false),
            }
        }

        #[test]
        fn prop_derive_deterministic(
            secret in ".{1,32}",
            public in ".{1,32}",
            nonce in any::<u64>(),
        ) {
            let server = ServerSeed::new(secret).unwrap();
            let client = ClientSeed::new(public).unwrap();
            let nonce = Nonce::new(nonce);
            prop_assert_eq!(
                derive_digest(&server, &client, nonce),
                derive_digest(&server, &client, nonce)
            );
        }
    }
}
