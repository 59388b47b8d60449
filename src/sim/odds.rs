//! Casino Odds
//!
//! Expected value, house edge and return-to-player for single bets, plus the
//! quoted tables for common games.
//!
//! For a stake `a`, payout multiple `k` and win probability `p`:
//!
//! ```text
//! EV   = a·k·p − a·(1 − p)
//! edge = |EV| / a · 100
//! RTP  = 100 − edge
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use super::SimError;
use crate::core::rng::DeterministicRng;

/// A single wager: pays `payout`× the stake with `probability_pct` chance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// Display name.
    pub name: String,
    /// Winnings per unit staked (stake returned on top).
    pub payout: f64,
    /// Chance of winning, in percent.
    pub probability_pct: f64,
}

impl Bet {
    /// Build a bet, rejecting negative payouts and probabilities outside 0–100.
    pub fn new(name: impl Into<String>, payout: f64, probability_pct: f64) -> Result<Self, SimError> {
        if !payout.is_finite() || payout < 0.0 {
            return Err(SimError::InvalidBet(format!("payout {} must be non-negative", payout)));
        }
        if !(0.0..=100.0).contains(&probability_pct) {
            return Err(SimError::InvalidBet(format!(
                "probability {}% outside 0-100",
                probability_pct
            )));
        }
        Ok(Self {
            name: name.into(),
            payout,
            probability_pct,
        })
    }

    fn table(name: &str, payout: f64, probability_pct: f64) -> Self {
        Self {
            name: name.to_string(),
            payout,
            probability_pct,
        }
    }
}

/// Games with a quoted bet table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasinoGame {
    /// American double-zero roulette.
    Roulette,
    /// Blackjack under basic strategy.
    Blackjack,
    /// Typical slot machine.
    Slots,
    /// Craps.
    Craps,
    /// Baccarat.
    Baccarat,
}

impl CasinoGame {
    /// Every game, in display order.
    pub const ALL: [CasinoGame; 5] = [
        CasinoGame::Roulette,
        CasinoGame::Blackjack,
        CasinoGame::Slots,
        CasinoGame::Craps,
        CasinoGame::Baccarat,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            CasinoGame::Roulette => "Roulette (American)",
            CasinoGame::Blackjack => "Blackjack (Basic Strategy)",
            CasinoGame::Slots => "Slot Machine (Typical)",
            CasinoGame::Craps => "Craps",
            CasinoGame::Baccarat => "Baccarat",
        }
    }

    /// Quoted house edge of the game, in percent.
    pub fn house_edge_pct(&self) -> f64 {
        match self {
            CasinoGame::Roulette => 5.26,
            CasinoGame::Blackjack => 0.5,
            CasinoGame::Slots => 5.0,
            CasinoGame::Craps => 1.41,
            CasinoGame::Baccarat => 1.06,
        }
    }

    /// Quoted return to player, in percent.
    pub fn rtp_pct(&self) -> f64 {
        100.0 - self.house_edge_pct()
    }

    /// The game's bet table.
    pub fn bets(&self) -> Vec<Bet> {
        match self {
            CasinoGame::Roulette => vec![
                Bet::table("Single Number", 35.0, 2.63),
                Bet::table("Split (2 numbers)", 17.0, 5.26),
                Bet::table("Street (3 numbers)", 11.0, 7.89),
                Bet::table("Corner (4 numbers)", 8.0, 10.53),
                Bet::table("Red/Black", 1.0, 47.37),
                Bet::table("Odd/Even", 1.0, 47.37),
                Bet::table("Dozen", 2.0, 31.58),
            ],
            CasinoGame::Blackjack => vec![
                Bet::table("Standard Bet", 1.0, 49.1),
                Bet::table("Blackjack", 1.5, 4.8),
                Bet::table("Insurance", 2.0, 30.8),
            ],
            CasinoGame::Slots => vec![
                Bet::table("Low Volatility", 1.0, 25.0),
                Bet::table("Medium Volatility", 5.0, 10.0),
                Bet::table("High Volatility", 50.0, 2.0),
                Bet::table("Jackpot", 1000.0, 0.01),
            ],
            CasinoGame::Craps => vec![
                Bet::table("Pass Line", 1.0, 49.29),
                Bet::table("Don't Pass", 1.0, 49.29),
                Bet::table("Field", 1.0, 44.44),
                Bet::table("Any 7", 4.0, 16.67),
                Bet::table("Hard 4/10", 7.0, 11.11),
            ],
            CasinoGame::Baccarat => vec![
                Bet::table("Banker", 0.95, 50.68),
                Bet::table("Player", 1.0, 49.32),
                Bet::table("Tie", 8.0, 9.51),
            ],
        }
    }

    /// Look up a bet by case-insensitive name.
    pub fn bet(&self, name: &str) -> Option<Bet> {
        self.bets().into_iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

impl FromStr for CasinoGame {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roulette" => Ok(CasinoGame::Roulette),
            "blackjack" => Ok(CasinoGame::Blackjack),
            "slots" | "slot" => Ok(CasinoGame::Slots),
            "craps" => Ok(CasinoGame::Craps),
            "baccarat" => Ok(CasinoGame::Baccarat),
            _ => Err(SimError::UnknownGame(s.to_string())),
        }
    }
}

impl fmt::Display for CasinoGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected net result of staking `amount` on `bet`.
pub fn expected_value(bet: &Bet, amount: f64) -> f64 {
    let win_prob = bet.probability_pct / 100.0;
    amount * bet.payout * win_prob - amount * (1.0 - win_prob)
}

/// Magnitude of the expected result as a percentage of the stake.
pub fn house_edge_pct(bet: &Bet, amount: f64) -> f64 {
    if amount == 0.0 {
        return 0.0;
    }
    expected_value(bet, amount).abs() / amount * 100.0
}

/// `100 - house_edge_pct`.
pub fn rtp_pct(bet: &Bet, amount: f64) -> f64 {
    100.0 - house_edge_pct(bet, amount)
}

/// One simulated wager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BetResult {
    /// 1-based index.
    pub bet: u32,
    /// Cumulative net after this bet.
    pub balance: f64,
    /// Did the bet win?
    pub won: bool,
}

/// Place `count` identical bets and track the running net.
///
/// A bet wins when `rng.next_percent() <= probability`.
pub fn simulate_bets(bet: &Bet, amount: f64, count: u32, rng: &mut DeterministicRng) -> Vec<BetResult> {
    let mut balance = 0.0;
    (1..=count)
        .map(|i| {
            let won = rng.next_percent() <= bet.probability_pct;
            if won {
                balance += amount * bet.payout;
            } else {
                balance -= amount;
            }
            BetResult { bet: i, balance, won }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_single_number_ev() {
        let bet = CasinoGame::Roulette.bet("single number").unwrap();
        // 100·35·0.0263 − 100·0.9737
        assert!(close(expected_value(&bet, 100.0), -5.32));
        assert!(close(house_edge_pct(&bet, 100.0), 5.32));
        assert!(close(rtp_pct(&bet, 100.0), 94.68));
    }

    #[test]
    fn test_fair_bet_has_no_edge() {
        let bet = Bet::new("coin", 1.0, 50.0).unwrap();
        assert!(close(expected_value(&bet, 10.0), 0.0));
        assert!(close(rtp_pct(&bet, 10.0), 100.0));
    }

    #[test]
    fn test_edge_is_magnitude() {
        let generous = Bet::new("generous", 2.0, 50.0).unwrap();
        assert!(close(expected_value(&generous, 10.0), 5.0));
        assert!(close(house_edge_pct(&generous, 10.0), 50.0));
    }

    #[test]
    fn test_invalid_bets() {
        assert!(Bet::new("x", -1.0, 50.0).is_err());
        assert!(Bet::new("x", 1.0, 100.5).is_err());
        assert!(Bet::new("x", 1.0, -0.1).is_err());
        assert!(Bet::new("x", f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_tables() {
        for game in CasinoGame::ALL {
            let bets = game.bets();
            assert!(!bets.is_empty());
            assert!(bets.iter().all(|b| (0.0..=100.0).contains(&b.probability_pct)));
            assert!(close(game.house_edge_pct() + game.rtp_pct(), 100.0));
        }
        assert_eq!(CasinoGame::Roulette.bets().len(), 7);
        assert!(CasinoGame::Craps.bet("Don't Pass").is_some());
        assert!(CasinoGame::Craps.bet("Lay 4").is_none());
    }

    #[test]
    fn test_game_parse() {
        assert_eq!("Baccarat".parse::<CasinoGame>().unwrap(), CasinoGame::Baccarat);
        assert_eq!("slot".parse::<CasinoGame>().unwrap(), CasinoGame::Slots);
        assert_eq!(
            "poker".parse::<CasinoGame>(),
            Err(SimError::UnknownGame("poker".into()))
        );
    }

    #[test]
    fn test_simulation_extremes() {
        let mut rng = DeterministicRng::new(7);

        let sure = Bet::new("sure", 1.0, 100.0).unwrap();
        let results = simulate_bets(&sure, 10.0, 50, &mut rng);
        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|r| r.won));
        assert!(close(results[49].balance, 500.0));

        let hopeless = Bet::new("hopeless", 1.0, 0.0).unwrap();
        let results = simulate_bets(&hopeless, 10.0, 50, &mut rng);
        assert!(results.iter().all(|r| !r.won));
        assert!(close(results[49].balance, -500.0));
        assert_eq!(results[0].bet, 1);
    }

    #[test]
    fn test_simulation_tracks_probability() {
        let mut rng = DeterministicRng::new(2024);
        let bet = CasinoGame::Roulette.bet("Red/Black").unwrap();
        let results = simulate_bets(&bet, 1.0, 20_000, &mut rng);
        let wins = results.iter().filter(|r| r.won).count() as f64;
        let rate = wins / 20_000.0 * 100.0;
        assert!((45.0..50.0).contains(&rate), "win rate {}", rate);
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let bet = CasinoGame::Baccarat.bet("Banker").unwrap();
        let a = simulate_bets(&bet, 5.0, 100, &mut DeterministicRng::new(11));
        let b = simulate_bets(&bet, 5.0, 100, &mut DeterministicRng::new(11));
        assert_eq!(a, b);
    }
}
