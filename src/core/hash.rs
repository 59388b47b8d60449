//! Hashing Primitives
//!
//! Thin wrappers over SHA-256 and HMAC-SHA256 used by:
//! - Server seed commitments (plain SHA-256)
//! - Keyed outcome derivation (HMAC-SHA256)
//! - Hex rendering of digests for display and interchange

use hmac::{Hmac, Mac};
use sha2::{Sha256, Digest};

/// Digest output type (256 bits / 32 bytes).
pub type Digest32 = [u8; 32];

/// HMAC over SHA-256.
type HmacSha256 = Hmac<Sha256>;

/// Length of a digest rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 64;

/// Compute a plain SHA-256 hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute HMAC-SHA256 of `message` keyed with `key`.
///
/// The transform is applied exactly once. HMAC accepts keys of any length,
/// including empty ones; callers enforce their own key policy.
pub fn keyed_digest(key: &[u8], message: &[u8]) -> Digest32 {
    // new_from_slice only fails for MACs with fixed key sizes, never for HMAC.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Render a digest as lowercase hex (2 characters per byte).
#[inline]
pub fn to_hex(digest: &Digest32) -> String {
    hex::encode(digest)
}

/// Parse a 64-character hex string into a digest.
///
/// Accepts upper or lower case. Returns `None` on wrong length or non-hex input.
pub fn from_hex(s: &str) -> Option<Digest32> {
    if s.len() != DIGEST_HEX_LEN {
        return None;
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out).ok()?;
    Some(out)
}

/// Constant-time equality for digests.
///
/// Examines every byte regardless of where the first difference is.
pub fn digests_equal(a: &Digest32, b: &Digest32) -> bool {
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // FIPS 180-2 "abc"
        assert_eq!(
            to_hex(&hash_bytes(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let digest = keyed_digest(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            to_hex(&digest),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_keyed_digest_determinism() {
        let a = keyed_digest(b"key", b"msg:1");
        let b = keyed_digest(b"key", b"msg:1");
        assert_eq!(a, b);

        let c = keyed_digest(b"key", b"msg:2");
        assert_ne!(a, c);
    }

    #[test]
    fn test_hex_roundtrip_and_case() {
        let digest = hash_bytes(b"seed");
        let hex_str = to_hex(&digest);
        assert_eq!(hex_str.len(), DIGEST_HEX_LEN);
        assert_eq!(hex_str, hex_str.to_lowercase());

        assert_eq!(from_hex(&hex_str), Some(digest));
        assert_eq!(from_hex(&hex_str.to_uppercase()), Some(digest));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert_eq!(from_hex(""), None);
        assert_eq!(from_hex("abcd"), None);
        assert_eq!(from_hex(&"g".repeat(DIGEST_HEX_LEN)), None);
        assert_eq!(from_hex(&"a".repeat(DIGEST_HEX_LEN + 2)), None);
    }

    #[test]
    fn test_digests_equal() {
        let a = hash_bytes(b"one");
        let mut b = a;
        assert!(digests_equal(&a, &b));

        b[31] ^= 1;
        assert!(!digests_equal(&a, &b));
    }
}
