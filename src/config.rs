//! Runtime Configuration
//!
//! Outcome moduli and simulation defaults, overridable from the environment.
//!
//! | Variable           | Default | Meaning                          |
//! |--------------------|---------|----------------------------------|
//! | `FAIR_DICE_MIN`    | 0       | Lower bound of the dice range    |
//! | `FAIR_DICE_MAX`    | 100     | Upper bound of the dice range    |
//! | `FAIR_WHEEL_MAX`   | 36      | Largest wheel pocket             |
//! | `FAIR_SLOT_REELS`  | 3       | Number of slot reels             |
//! | `FAIR_COIN_HEADS`  | Heads   | Label for an even leading value  |
//! | `FAIR_COIN_TAILS`  | Tails   | Label for an odd leading value   |
//! | `FAIR_SIM_ROUNDS`  | 100     | Rounds per simulation            |
//! | `FAIR_SIM_BALANCE` | 1000    | Starting balance for simulations |

use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::fair::{FairError, OutcomeKind, OutcomeSpec};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable is set but does not parse.
    #[error("{var}: cannot parse {value:?}")]
    Parse {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Values parse but describe an invalid mapping.
    #[error("invalid outcome configuration: {0}")]
    Outcome(#[from] FairError),

    /// Simulation parameters out of range.
    #[error("invalid simulation configuration: {0}")]
    Simulation(String),
}

/// Read `var` through `lookup`, parsing it when present.
fn parse_var<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { var, value }),
        None => Ok(default),
    }
}

/// Parameters for the four outcome mappings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeConfig {
    /// Dice lower bound.
    pub dice_min: i64,
    /// Dice upper bound.
    pub dice_max: i64,
    /// Largest wheel value.
    pub wheel_max: u32,
    /// Reels per slot spin.
    pub slot_reels: u8,
    /// Even label.
    pub coin_heads: String,
    /// Odd label.
    pub coin_tails: String,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            dice_min: 0,
            dice_max: 100,
            wheel_max: 36,
            slot_reels: 3,
            coin_heads: "Heads".to_string(),
            coin_tails: "Tails".to_string(),
        }
    }
}

impl OutcomeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            dice_min: parse_var(&lookup, "FAIR_DICE_MIN", defaults.dice_min)?,
            dice_max: parse_var(&lookup, "FAIR_DICE_MAX", defaults.dice_max)?,
            wheel_max: parse_var(&lookup, "FAIR_WHEEL_MAX", defaults.wheel_max)?,
            slot_reels: parse_var(&lookup, "FAIR_SLOT_REELS", defaults.slot_reels)?,
            coin_heads: lookup("FAIR_COIN_HEADS").unwrap_or(defaults.coin_heads),
            coin_tails: lookup("FAIR_COIN_TAILS").unwrap_or(defaults.coin_tails),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every mapping this config produces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in OutcomeKind::ALL {
            self.spec_for(kind).validate()?;
        }
        Ok(())
    }

    /// Outcome spec for a kind under this config.
    pub fn spec_for(&self, kind: OutcomeKind) -> OutcomeSpec {
        match kind {
            OutcomeKind::RangedNumber => OutcomeSpec::RangedNumber {
                min: self.dice_min,
                max: self.dice_max,
            },
            OutcomeKind::Binary => OutcomeSpec::Binary {
                even: self.coin_heads.clone(),
                odd: self.coin_tails.clone(),
            },
            OutcomeKind::BoundedInteger => OutcomeSpec::BoundedInteger { max: self.wheel_max },
            OutcomeKind::SymbolTuple => OutcomeSpec::SymbolTuple { reels: self.slot_reels },
        }
    }
}

/// Defaults for the betting simulations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Rounds (or bets) per run.
    pub rounds: u32,
    /// Starting bankroll.
    pub starting_balance: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            starting_balance: 1000.0,
        }
    }
}

impl SimConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            rounds: parse_var(&lookup, "FAIR_SIM_ROUNDS", defaults.rounds)?,
            starting_balance: parse_var(&lookup, "FAIR_SIM_BALANCE", defaults.starting_balance)?,
        };
        if config.rounds == 0 {
            return Err(ConfigError::Simulation("rounds must be at least 1".into()));
        }
        if !config.starting_balance.is_finite() || config.starting_balance <= 0.0 {
            return Err(ConfigError::Simulation(format!(
                "starting balance must be positive, got {}",
                config.starting_balance
            )));
        }
        Ok(config)
    }
}

// =============================================================================
// TESTS
// =============================================================================
