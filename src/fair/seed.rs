//! Seeds and Nonces
//!
//! Validated wrappers for the three derivation inputs. Construction is the
//! only place emptiness and sign are checked; everything downstream can
//! assume well-formed values.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::entropy;
use super::error::{FairError, FairResult};

/// The issuer's secret. Disclosed only when a session is revealed.
///
/// `Debug` redacts the value so secrets never land in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerSeed(String);

impl ServerSeed {
    /// Wrap a secret. Fails if empty.
    pub fn new(value: impl Into<String>) -> FairResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(FairError::EmptyServerSeed);
        }
        Ok(Self(value))
    }

    /// Generate a fresh `casino_server_secret_…` seed from the OS RNG.
    pub fn generate() -> Self {
        Self(entropy::generate_server_seed_string())
    }

    /// The secret text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-8 bytes used as the HMAC key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ServerSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServerSeed(<redacted, {} bytes>)", self.0.len())
    }
}

impl TryFrom<String> for ServerSeed {
    type Error = FairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerSeed> for String {
    fn from(seed: ServerSeed) -> Self {
        seed.0
    }
}

/// The receiver's public seed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientSeed(String);

impl ClientSeed {
    /// Wrap a client seed. Fails if empty.
    pub fn new(value: impl Into<String>) -> FairResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(FairError::EmptyClientSeed);
        }
        Ok(Self(value))
    }

    /// Generate a fresh `player_…` seed from the OS RNG.
    pub fn generate() -> Self {
        Self(entropy::generate_client_seed_string())
    }

    /// The seed text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClientSeed {
    type Error = FairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientSeed> for String {
    fn from(seed: ClientSeed) -> Self {
        seed.0
    }
}

/// Per-derivation counter. Starts at 0 and advances by exactly 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    /// First nonce of a session.
    pub const ZERO: Nonce = Nonce(0);

    /// Create from an unsigned value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Underlying value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The following nonce. Saturates at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for Nonce {
    type Error = FairError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| FairError::NegativeNonce(value))
    }
}

impl FromStr for Nonce {
    type Err = FairError;

    /// Parse decimal text. A leading `-` is reported as a negative nonce.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return match trimmed.parse::<i64>() {
                Ok(v) => Err(FairError::NegativeNonce(v)),
                Err(_) => Err(FairError::MalformedNonce(s.to_string())),
            };
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| FairError::MalformedNonce(s.to_string()))
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_seeds_rejected() {
        assert_eq!(ServerSeed::new(""), Err(FairError::EmptyServerSeed));
        assert_eq!(ClientSeed::new(""), Err(FairError::EmptyClientSeed));
        assert!(ServerSeed::new("x").is_ok());
        assert!(ClientSeed::new("y").is_ok());
    }

    #[test]
    fn test_server_seed_debug_redacts() {
        let seed = ServerSeed::new("top-secret").unwrap();
        let shown = format!("{:?}", seed);
        assert!(!shown.contains("top-secret"));
        assert!(shown.contains("10 bytes"));
    }

    #[test]
    fn test_nonce_parsing() {
        assert_eq!("0".parse::<Nonce>(), Ok(Nonce::ZERO));
        assert_eq!(" 42 ".parse::<Nonce>(), Ok(Nonce::new(42)));
        assert_eq!("-3".parse::<Nonce>(), Err(FairError::NegativeNonce(-3)));
        assert!(matches!("abc".parse::<Nonce>(), Err(FairError::MalformedNonce(_))));
        assert!(matches!("".parse::<Nonce>(), Err(FairError::MalformedNonce(_))));
        assert!(matches!("-x".parse::<Nonce>(), Err(FairError::MalformedNonce(_))));
    }

    #[test]
    fn test_nonce_from_signed() {
        assert_eq!(Nonce::try_from(7i64), Ok(Nonce::new(7)));
        assert_eq!(Nonce::try_from(-1i64), Err(FairError::NegativeNonce(-1)));
    }

    #[test]
    fn test_nonce_next() {
        assert_eq!(Nonce::ZERO.next(), Nonce::new(1));
        assert_eq!(Nonce::new(u64::MAX).next(), Nonce::new(u64::MAX));
    }

    #[test]
    fn test_seed_serde_rejects_empty() {
        let ok: ClientSeed = serde_json::from_str("\"player_1\"").unwrap();
        assert_eq!(ok.as_str(), "player_1");

        assert!(serde_json::from_str::<ServerSeed>("\"\"").is_err());
    }

    #[test]
    fn test_generated_seeds_are_valid() {
        assert!(!ServerSeed::generate().as_str().is_empty());
        assert!(ClientSeed::generate().as_str().starts_with("player_"));
    }
}
