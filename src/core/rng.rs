//! Deterministic Random Number Generator
//!
//! Xorshift-family PRNG used to drive the casino simulations.
//! Seeded from a fair derivation digest, so a whole simulation run can be
//! replayed by anyone holding `(server seed, client seed, nonce)`.

use serde::{Serialize, Deserialize};

use super::hash::Digest32;

/// Deterministic PRNG (Xorshift-family, 128-bit state).
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of random numbers on any platform.
///
/// # Example
///
/// ```
/// use provably_fair::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(42);
/// let value = rng.next_u64();
/// assert_eq!(value, 16629283624882167704); // Always the same!
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create RNG from a fair derivation digest.
    ///
    /// The first 8 bytes (little-endian) become the seed.
    pub fn from_digest(digest: &Digest32) -> Self {
        Self::new(seed_from_digest(digest))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, max).
    ///
    /// Uses rejection sampling for uniform distribution.
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let max = max as u64;
        // Largest multiple of `max` that fits in u64; draws above it are biased.
        let zone = u64::MAX - (u64::MAX % max);
        loop {
            let value = self.next_u64();
            if value < zone {
                return (value % max) as u32;
            }
        }
    }

    /// Generate a uniform float in [0, 1) with 53 bits of precision.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a percentage in [0, 100).
    #[inline]
    pub fn next_percent(&mut self) -> f64 {
        self.next_f64() * 100.0
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Take the first 8 bytes of a digest as a little-endian seed.
pub fn seed_from_digest(digest: &Digest32) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
