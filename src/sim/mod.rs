//! Simulations
//!
//! Casino maths driven by a [`DeterministicRng`] seeded from a fair digest,
//! so any run can be replayed from `(server seed, client seed, nonce)`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SIMULATIONS                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  odds.rs      - Bet tables, EV, house edge, bet simulation  │
//! │  strategy.rs  - Martingale, Fibonacci, Paroli, …            │
//! │  blackjack.rs - Hand values, basic strategy, trainer        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod blackjack;
pub mod odds;
pub mod strategy;

use thiserror::Error;

use crate::core::rng::DeterministicRng;
use crate::fair::{derive_digest, ClientSeed, Nonce, ServerSeed};

pub use blackjack::{correct_action, hand_value, Action, Difficulty, HandValue, Rank, Trainer};
pub use odds::{expected_value, house_edge_pct, rtp_pct, simulate_bets, Bet, BetResult, CasinoGame};
pub use strategy::{simulate_strategy, Strategy, StrategyConfig, StrategyReport};

/// Simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Unknown game name.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    /// Unknown strategy name.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Unknown card label.
    #[error("unknown card: {0}")]
    UnknownCard(String),

    /// Bet parameters out of range.
    #[error("invalid bet: {0}")]
    InvalidBet(String),

    /// Simulation parameters out of range.
    #[error("invalid simulation: {0}")]
    InvalidConfig(String),

    /// Hand needs at least one card.
    #[error("empty hand")]
    EmptyHand,
}

/// Seed a simulation RNG from one fair derivation.
pub fn seeded_rng(server_seed: &ServerSeed, client_seed: &ClientSeed, nonce: Nonce) -> DeterministicRng {
    let digest = derive_digest(server_seed, client_seed, nonce);
    DeterministicRng::from_digest(digest.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let server = ServerSeed::new("s3cr3t").unwrap();
        let client = ClientSeed::new("abc").unwrap();

        let mut a = seeded_rng(&server, &client, Nonce::ZERO);
        let mut b = seeded_rng(&server, &client, Nonce::ZERO);
        let mut c = seeded_rng(&server, &client, Nonce::new(1));

        let xs: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        let zs: Vec<u64> = (0..8).map(|_| c.next_u64()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
    }
}
