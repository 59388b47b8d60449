//! Outcome Mapping
//!
//! Turns a derived digest into a game result. Every mapping reads the same
//! "leading integer" (first 4 bytes, i.e. first 8 hex characters, big-endian)
//! and reduces it according to an [`OutcomeSpec`].
//!
//! ```text
//! ┌──────────────────┬───────────────────────────────────────────────┐
//! │ kind             │ mapping of leading integer L                  │
//! ├──────────────────┼───────────────────────────────────────────────┤
//! │ ranged-number    │ min + (L mod ((max-min)*100 + 1)) / 100       │
//! │ binary           │ L even → first label, odd → second            │
//! │ bounded-integer  │ L mod (max + 1)                               │
//! │ symbol-tuple     │ decimal digits of L, one per reel, 0-9        │
//! └──────────────────┴───────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize, Serializer, Deserializer};

use crate::core::hash::Digest32;
use super::error::{FairError, FairResult};

/// Hex characters read from the front of a digest.
pub const LEADING_HEX_CHARS: usize = 8;

/// Widest ranged-number span whose modulus still fits the leading integer.
pub const MAX_RANGED_SPAN: i64 = (u32::MAX as i64) / 100;

/// Most reels a symbol tuple can have (digits in `u32::MAX`).
pub const MAX_REELS: u8 = 10;

/// Caller-selected mapping strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    /// Number with two decimal places in `[min, max]` (dice).
    RangedNumber,
    /// One of two labels (coin flip).
    Binary,
    /// Integer in `[0, max]` (roulette wheel).
    BoundedInteger,
    /// Tuple of 0-9 symbol indices (slot reels).
    SymbolTuple,
}

impl OutcomeKind {
    /// All kinds, in display order.
    pub const ALL: [OutcomeKind; 4] = [
        OutcomeKind::RangedNumber,
        OutcomeKind::Binary,
        OutcomeKind::BoundedInteger,
        OutcomeKind::SymbolTuple,
    ];

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::RangedNumber => "ranged-number",
            OutcomeKind::Binary => "binary",
            OutcomeKind::BoundedInteger => "bounded-integer",
            OutcomeKind::SymbolTuple => "symbol-tuple",
        }
    }

    /// Game name this kind models by default.
    pub fn game_name(&self) -> &'static str {
        match self {
            OutcomeKind::RangedNumber => "dice",
            OutcomeKind::Binary => "coin",
            OutcomeKind::BoundedInteger => "roulette",
            OutcomeKind::SymbolTuple => "slots",
        }
    }
}

impl FromStr for OutcomeKind {
    type Err = FairError;

    /// Accepts canonical names and the game aliases `dice`, `coin`,
    /// `roulette`/`wheel`, `slots`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranged-number" | "ranged" | "dice" => Ok(OutcomeKind::RangedNumber),
            "binary" | "coin" => Ok(OutcomeKind::Binary),
            "bounded-integer" | "bounded" | "roulette" | "wheel" => Ok(OutcomeKind::BoundedInteger),
            "symbol-tuple" | "multi-symbol" | "symbols" | "slots" => Ok(OutcomeKind::SymbolTuple),
            _ => Err(FairError::UnknownOutcomeKind(s.to_string())),
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one outcome mapping. The moduli live here, not in code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeSpec {
    /// Two-decimal number in `[min, max]`.
    RangedNumber {
        /// Lower bound (whole number).
        min: i64,
        /// Upper bound (whole number).
        max: i64,
    },
    /// Even → `even`, odd → `odd`.
    Binary {
        /// Label for an even leading integer.
        even: String,
        /// Label for an odd leading integer.
        odd: String,
    },
    /// Integer in `[0, max]`.
    BoundedInteger {
        /// Largest value.
        max: u32,
    },
    /// `reels` decimal digits of the leading integer.
    SymbolTuple {
        /// Number of reels.
        reels: u8,
    },
}

impl OutcomeSpec {
    /// Dice roll 0.00 – 100.00.
    pub fn dice() -> Self {
        OutcomeSpec::RangedNumber { min: 0, max: 100 }
    }

    /// Heads / Tails.
    pub fn coin() -> Self {
        OutcomeSpec::Binary {
            even: "Heads".to_string(),
            odd: "Tails".to_string(),
        }
    }

    /// Single-zero wheel, 0 – 36.
    pub fn roulette() -> Self {
        OutcomeSpec::BoundedInteger { max: 36 }
    }

    /// Three reels of ten symbols.
    pub fn slots() -> Self {
        OutcomeSpec::SymbolTuple { reels: 3 }
    }

    /// Default spec for a kind.
    pub fn default_for(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::RangedNumber => Self::dice(),
            OutcomeKind::Binary => Self::coin(),
            OutcomeKind::BoundedInteger => Self::roulette(),
            OutcomeKind::SymbolTuple => Self::slots(),
        }
    }

    /// Which kind this spec maps to.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            OutcomeSpec::RangedNumber { .. } => OutcomeKind::RangedNumber,
            OutcomeSpec::Binary { .. } => OutcomeKind::Binary,
            OutcomeSpec::BoundedInteger { .. } => OutcomeKind::BoundedInteger,
            OutcomeSpec::SymbolTuple { .. } => OutcomeKind::SymbolTuple,
        }
    }

    /// Reject specs whose mapping would be ill-defined.
    pub fn validate(&self) -> FairResult<()> {
        match self {
            OutcomeSpec::RangedNumber { min, max } => {
                let span_ok = max.checked_sub(*min).map_or(false, |span| span <= MAX_RANGED_SPAN);
                let scaled_ok = min.checked_mul(100).is_some() && max.checked_mul(100).is_some();
                if min > max || !span_ok || !scaled_ok {
                    return Err(FairError::InvalidBounds { min: *min, max: *max });
                }
            }
            OutcomeSpec::Binary { even, odd } => {
                if even.is_empty() || odd.is_empty() || even == odd {
                    return Err(FairError::InvalidBinaryLabels);
                }
            }
            OutcomeSpec::BoundedInteger { .. } => {}
            OutcomeSpec::SymbolTuple { reels } => {
                if *reels == 0 || *reels > MAX_REELS {
                    return Err(FairError::InvalidReelCount(*reels));
                }
            }
        }
        Ok(())
    }

    /// Modulus applied to the leading integer, where the kind has one.
    pub fn modulus(&self) -> Option<u64> {
        match self {
            OutcomeSpec::RangedNumber { min, max } => max
                .checked_sub(*min)
                .and_then(|span| u64::try_from(span).ok())
                .and_then(|span| span.checked_mul(100))
                .map(|hundredths| hundredths + 1),
            OutcomeSpec::Binary { .. } => Some(2),
            OutcomeSpec::BoundedInteger { max } => Some(u64::from(*max) + 1),
            OutcomeSpec::SymbolTuple { reels } => 10u64.checked_pow(u32::from(*reels)),
        }
    }

    /// Map an already-extracted leading integer. The spec must be valid.
    fn map_leading(&self, leading: u32) -> Outcome {
        let leading = u64::from(leading);
        match self {
            OutcomeSpec::RangedNumber { min, max } => {
                let modulus = ((max - min) as u64) * 100 + 1;
                let offset = (leading % modulus) as i64;
                Outcome::Number(Hundredths(min * 100 + offset))
            }
            OutcomeSpec::Binary { even, odd } => {
                let label = if leading % 2 == 0 { even } else { odd };
                Outcome::Label(label.clone())
            }
            OutcomeSpec::BoundedInteger { max } => {
                Outcome::Integer((leading % (u64::from(*max) + 1)) as u32)
            }
            OutcomeSpec::SymbolTuple { reels } => {
                let reels = u32::from(*reels);
                let symbols = (0..reels)
                    .map(|i| ((leading / 10u64.pow(reels - 1 - i)) % 10) as u8)
                    .collect();
                Outcome::Symbols(symbols)
            }
        }
    }
}

impl Default for OutcomeSpec {
    fn default() -> Self {
        Self::dice()
    }
}

/// Fixed-point number with two decimal places (value × 100).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hundredths(pub i64);

impl Hundredths {
    /// Raw value in hundredths.
    pub fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Hundredths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Hundredths {
    type Err = FairError;

    /// Parse `[-]W.FF`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FairError::MalformedNumber(s.to_string());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = body.split_once('.').ok_or_else(malformed)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if frac.len() != 2 || !digits(frac) || !digits(whole) {
            return Err(malformed());
        }
        let whole: i64 = whole.parse().map_err(|_| malformed())?;
        let frac: i64 = frac.parse().map_err(|_| malformed())?;
        let magnitude = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(malformed)?;
        Ok(Hundredths(if negative { -magnitude } else { magnitude }))
    }
}

impl Serialize for Hundredths {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_string().serialize(s)
    }
}

impl<'de> Deserialize<'de> for Hundredths {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A game result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Ranged number with two decimals.
    Number(Hundredths),
    /// Binary label.
    Label(String),
    /// Bounded integer.
    Integer(u32),
    /// Symbol indices, left reel first.
    Symbols(Vec<u8>),
}

impl Outcome {
    /// Kind of mapping that produced this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Number(_) => OutcomeKind::RangedNumber,
            Outcome::Label(_) => OutcomeKind::Binary,
            Outcome::Integer(_) => OutcomeKind::BoundedInteger,
            Outcome::Symbols(_) => OutcomeKind::SymbolTuple,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Number(n) => write!(f, "{}", n),
            Outcome::Label(label) => f.write_str(label),
            Outcome::Integer(n) => write!(f, "{}", n),
            Outcome::Symbols(symbols) => {
                let parts: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Parse the leading integer from digest hex.
pub fn leading_integer(digest_hex: &str) -> FairResult<u32> {
    let head = digest_hex
        .get(..LEADING_HEX_CHARS)
        .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| FairError::MalformedDigest(digest_hex.to_string()))?;
    u32::from_str_radix(head, 16).map_err(|_| FairError::MalformedDigest(digest_hex.to_string()))
}

/// Leading integer straight from digest bytes.
pub fn leading_integer_of(digest: &Digest32) -> u32 {
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Map digest hex to an outcome.
///
/// Pure and total for a valid spec and a digest of at least 8 hex characters.
pub fn map_to_outcome(digest_hex: &str, spec: &OutcomeSpec) -> FairResult<Outcome> {
    spec.validate()?;
    let leading = leading_integer(digest_hex)?;
    Ok(spec.map_leading(leading))
}

/// Map digest bytes to an outcome.
pub fn map_digest(digest: &Digest32, spec: &OutcomeSpec) -> FairResult<Outcome> {
    spec.validate()?;
    Ok(spec.map_leading(leading_integer_of(digest)))
}
