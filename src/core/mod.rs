//! Core primitives.
//!
//! Hashing, randomness and statistics shared by the fair deriver and the
//! simulations. Everything here except [`entropy`] is deterministic.

pub mod entropy;
pub mod hash;
pub mod rng;
pub mod stats;

// Re-export core types
pub use entropy::EntropyError;
pub use hash::{Digest32, hash_bytes, keyed_digest};
pub use rng::DeterministicRng;
pub use stats::{Histogram, RollingWindow, Summary};
