//! Provably Fair Outcomes
//!
//! Deterministic, independently verifiable game outcomes from three inputs:
//! a secret server seed, a public client seed and a nonce.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FAIR-OUTCOME DERIVER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  seed.rs       - ServerSeed, ClientSeed, Nonce              │
//! │  commitment.rs - SHA-256 commitment to the server seed      │
//! │  deriver.rs    - HMAC-SHA256(seed, "client:nonce")          │
//! │  outcome.rs    - Digest → dice / coin / wheel / reels       │
//! │  session.rs    - Commit, play, reveal                       │
//! │  verify.rs     - Commitment check and round replay          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions are pure over their inputs and safe to call concurrently.

pub mod commitment;
pub mod deriver;
pub mod error;
pub mod outcome;
pub mod seed;
pub mod session;
pub mod verify;

// Re-export key types
pub use commitment::{commit, Commitment};
pub use deriver::{combined_input, derive, derive_digest, derive_outcome, Derivation, DerivedDigest};
pub use error::{FairError, FairResult};
pub use outcome::{map_to_outcome, Hundredths, Outcome, OutcomeKind, OutcomeSpec};
pub use seed::{ClientSeed, Nonce, ServerSeed};
pub use session::{FairSession, RoundRecord, SessionError, SessionReveal};
pub use verify::{audit_rounds, verify, verify_hex, AuditError, AuditReport, RoundAudit};
