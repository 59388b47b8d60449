//! # Provably Fair
//!
//! Commit-reveal outcome derivation for games of chance.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PROVABLY FAIR                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                               │
//! │  ├── hash.rs     - SHA-256, HMAC-SHA256, hex                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG          │
//! │  ├── entropy.rs  - OS-random seeds and ranges               │
//! │  └── stats.rs    - Summary, histogram, rolling window       │
//! │                                                             │
//! │  fair/           - Outcome derivation (deterministic)       │
//! │  ├── seed.rs     - Server seed, client seed, nonce          │
//! │  ├── commitment.rs - SHA-256 commitment                     │
//! │  ├── deriver.rs  - HMAC digest per round                    │
//! │  ├── outcome.rs  - Digest → dice / coin / wheel / reels     │
//! │  ├── session.rs  - Commit, play, reveal                     │
//! │  └── verify.rs   - Commitment and round audits              │
//! │                                                             │
//! │  sim/            - Simulations on a fair-seeded PRNG        │
//! │  ├── odds.rs     - EV, house edge, bet simulation           │
//! │  ├── strategy.rs - Staking systems                          │
//! │  └── blackjack.rs- Basic strategy and trainer               │
//! │                                                             │
//! │  config.rs       - Environment configuration                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given `(server seed, client seed, nonce)`, the digest and outcome are
//! identical on every platform. Anyone holding the revealed server seed can
//! recompute every round and check it against the published commitment.
//!
//! ```
//! use provably_fair::fair::{commit, derive, verify, OutcomeSpec};
//!
//! let commitment = commit("s3cr3t").unwrap();
//! let round = derive("s3cr3t", "abc", 0, &OutcomeSpec::dice()).unwrap();
//! assert_eq!(round.outcome.to_string(), "50.96");
//! assert!(verify("s3cr3t", &commitment));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod fair;
pub mod sim;

// Re-export commonly used types
pub use config::{ConfigError, OutcomeConfig, SimConfig};
pub use core::rng::DeterministicRng;
pub use fair::{
    commit, derive, map_to_outcome, verify, ClientSeed, Commitment, Derivation, FairError, FairSession,
    Nonce, Outcome, OutcomeKind, OutcomeSpec, ServerSeed, SessionReveal,
};
pub use sim::SimError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
