//! Betting Strategy Simulator
//!
//! Plays an even-money bet repeatedly under a staking system and reports how
//! the bankroll fared. No system changes the expected value of the bet; the
//! simulator exists to show that.
//!
//! Stakes are clamped to the current balance, and a run stops as soon as the
//! balance reaches zero.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use tracing::debug;

use super::SimError;
use crate::core::rng::DeterministicRng;

/// Labouchère starting line.
pub const LABOUCHERE_START: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

/// Paroli stops pressing after this many consecutive wins.
pub const PAROLI_MAX_STREAK: u32 = 3;

/// Staking systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Double after every loss.
    Martingale,
    /// Follow the Fibonacci sequence after losses.
    Fibonacci,
    /// One tenth of a unit up per loss, down per win.
    DAlembert,
    /// Always the base stake.
    Flat,
    /// Double after every win, up to three.
    Paroli,
    /// Cancellation line.
    Labouchere,
}

impl Strategy {
    /// Every strategy, in display order.
    pub const ALL: [Strategy; 6] = [
        Strategy::Martingale,
        Strategy::Fibonacci,
        Strategy::DAlembert,
        Strategy::Flat,
        Strategy::Paroli,
        Strategy::Labouchere,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Martingale => "Martingale System",
            Strategy::Fibonacci => "Fibonacci System",
            Strategy::DAlembert => "D'Alembert System",
            Strategy::Flat => "Flat Betting",
            Strategy::Paroli => "Paroli System",
            Strategy::Labouchere => "Labouchere System",
        }
    }

    /// One-line rule summary.
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Martingale => "Double your bet after every loss, return to base bet after win",
            Strategy::Fibonacci => "Increase bet following Fibonacci sequence after loss",
            Strategy::DAlembert => "Increase bet by 1 unit after loss, decrease by 1 unit after win",
            Strategy::Flat => "Always bet the same amount (control group)",
            Strategy::Paroli => "Double bet after win, reset to base after loss (reverse Martingale)",
            Strategy::Labouchere => "Bet sum of first and last numbers in sequence",
        }
    }
}

impl FromStr for Strategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['\'', '-', '_', ' '], "").as_str() {
            "martingale" => Ok(Strategy::Martingale),
            "fibonacci" => Ok(Strategy::Fibonacci),
            "dalembert" => Ok(Strategy::DAlembert),
            "flat" => Ok(Strategy::Flat),
            "paroli" => Ok(Strategy::Paroli),
            "labouchere" => Ok(Strategy::Labouchere),
            _ => Err(SimError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `fib(0) = fib(1) = 1`.
fn fibonacci(n: u32) -> f64 {
    let (mut a, mut b) = (1.0f64, 1.0f64);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// Parameters of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Staking system.
    pub strategy: Strategy,
    /// Starting bankroll.
    pub starting_balance: f64,
    /// Base stake.
    pub base_bet: f64,
    /// Chance of winning each even-money bet, in percent.
    pub win_probability_pct: f64,
    /// Maximum rounds to play.
    pub rounds: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Martingale,
            starting_balance: 1000.0,
            base_bet: 10.0,
            // Red/black on a double-zero wheel.
            win_probability_pct: 47.37,
            rounds: 100,
        }
    }
}

impl StrategyConfig {
    /// Reject runs that cannot be played.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.starting_balance.is_finite() || self.starting_balance <= 0.0 {
            return Err(SimError::InvalidConfig("starting balance must be positive".into()));
        }
        if !self.base_bet.is_finite() || self.base_bet <= 0.0 {
            return Err(SimError::InvalidConfig("base bet must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.win_probability_pct) {
            return Err(SimError::InvalidConfig("win probability must be within 0-100".into()));
        }
        if self.rounds == 0 {
            return Err(SimError::InvalidConfig("rounds must be at least 1".into()));
        }
        Ok(())
    }
}

/// One played round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyRound {
    /// 1-based round number.
    pub round: u32,
    /// Balance after the round.
    pub balance: f64,
    /// Stake placed.
    pub bet: f64,
    /// Did the round win?
    pub won: bool,
}

/// Summary of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    /// Strategy played.
    pub strategy: Strategy,
    /// Balance at the end.
    pub final_balance: f64,
    /// `final - starting`.
    pub profit: f64,
    /// Profit relative to the starting balance, in percent.
    pub profit_pct: f64,
    /// Highest balance seen.
    pub max_balance: f64,
    /// Lowest balance seen.
    pub min_balance: f64,
    /// Sum of all stakes.
    pub total_wagered: f64,
    /// Rounds won.
    pub wins: u32,
    /// Rounds lost.
    pub losses: u32,
    /// `wins / rounds`, in percent.
    pub win_rate_pct: f64,
    /// Largest stake placed.
    pub max_bet: f64,
    /// Mean stake.
    pub avg_bet: f64,
    /// Profit relative to total wagered, in percent.
    pub roi_pct: f64,
    /// Rounds actually played.
    pub rounds_played: u32,
    /// Did the bankroll hit zero?
    pub busted: bool,
    /// Per-round history.
    pub rounds: Vec<StrategyRound>,
}

/// Mutable staking state carried between rounds.
struct Staking {
    loss_streak: u32,
    win_streak: u32,
    units: u32,
    line: Vec<f64>,
}

impl Staking {
    fn new() -> Self {
        Self {
            loss_streak: 0,
            win_streak: 0,
            units: 0,
            line: LABOUCHERE_START.to_vec(),
        }
    }

    fn stake(&self, strategy: Strategy, base: f64) -> f64 {
        match strategy {
            Strategy::Martingale => base * 2f64.powi(self.loss_streak.min(1023) as i32),
            Strategy::Fibonacci => base * fibonacci(self.loss_streak),
            Strategy::DAlembert => base + f64::from(self.units) * base * 0.1,
            Strategy::Flat => base,
            Strategy::Paroli => base * 2f64.powi(self.win_streak.min(PAROLI_MAX_STREAK) as i32),
            Strategy::Labouchere => match self.line.as_slice() {
                [] => base,
                [only] => base * only,
                [first, .., last] => base * (first + last),
            },
        }
    }

    fn record_win(&mut self, strategy: Strategy) {
        self.loss_streak = 0;
        self.win_streak += 1;
        self.units = self.units.saturating_sub(1);

        if strategy == Strategy::Labouchere && !self.line.is_empty() {
            if self.line.len() <= 2 {
                self.line = LABOUCHERE_START.to_vec();
            } else {
                self.line.remove(0);
                self.line.pop();
            }
        }
    }

    fn record_loss(&mut self, strategy: Strategy, stake: f64, base: f64) {
        self.loss_streak += 1;
        self.win_streak = 0;
        self.units += 1;

        if strategy == Strategy::Labouchere {
            self.line.push(stake / base);
        }
    }
}

/// Play `config.rounds` even-money bets under `config.strategy`.
///
/// A round wins when `rng.next_percent() <= win_probability_pct`.
pub fn simulate_strategy(config: &StrategyConfig, rng: &mut DeterministicRng) -> Result<StrategyReport, SimError> {
    config.validate()?;

    let base = config.base_bet;
    let mut staking = Staking::new();
    let mut balance = config.starting_balance;
    let mut max_balance = balance;
    let mut min_balance = balance;
    let mut max_bet = base;
    let mut total_wagered = 0.0;
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut rounds = Vec::new();

    for round in 1..=config.rounds {
        let stake = staking.stake(config.strategy, base).min(balance);
        max_bet = max_bet.max(stake);
        total_wagered += stake;

        let won = rng.next_percent() <= config.win_probability_pct;
        if won {
            balance += stake;
            wins += 1;
            staking.record_win(config.strategy);
        } else {
            balance -= stake;
            losses += 1;
            staking.record_loss(config.strategy, stake, base);
        }

        max_balance = max_balance.max(balance);
        min_balance = min_balance.min(balance);
        rounds.push(StrategyRound { round, balance, bet: stake, won });

        if balance <= 0.0 {
            debug!(strategy = %config.strategy, round, "bankroll exhausted");
            break;
        }
        if config.strategy == Strategy::Paroli && staking.win_streak >= PAROLI_MAX_STREAK {
            staking.win_streak = 0;
        }
    }

    let rounds_played = rounds.len() as u32;
    let profit = balance - config.starting_balance;
    let percent_of = |part: f64, whole: f64| if whole > 0.0 { part / whole * 100.0 } else { 0.0 };

    Ok(StrategyReport {
        strategy: config.strategy,
        final_balance: balance,
        profit,
        profit_pct: percent_of(profit, config.starting_balance),
        max_balance,
        min_balance,
        total_wagered,
        wins,
        losses,
        win_rate_pct: percent_of(f64::from(wins), f64::from(wins + losses)),
        max_bet,
        avg_bet: if rounds_played > 0 { total_wagered / f64::from(rounds_played) } else { 0.0 },
        roi_pct: percent_of(profit, total_wagered),
        rounds_played,
        busted: balance <= 0.0,
        rounds,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(strategy: Strategy, win_probability_pct: f64, rounds: u32) -> StrategyReport {
        let config = StrategyConfig {
            strategy,
            win_probability_pct,
            rounds,
            ..StrategyConfig::default()
        };
        simulate_strategy(&config, &mut DeterministicRng::new(99)).unwrap()
    }

    fn stakes(report: &StrategyReport) -> Vec<f64> {
        report.rounds.iter().map(|r| r.bet).collect()
    }

    #[test]
    fn test_fibonacci_sequence() {
        let seq: Vec<f64> = (0..8).map(fibonacci).collect();
        assert_eq!(seq, vec![1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]);
    }

    #[test]
    fn test_martingale_wins_flat_stakes() {
        let report = run(Strategy::Martingale, 100.0, 100);
        assert_eq!(report.wins, 100);
        assert_eq!(report.final_balance, 2000.0);
        assert_eq!(report.max_bet, 10.0);
        assert_eq!(report.win_rate_pct, 100.0);
        assert!(!report.busted);
    }

    #[test]
    fn test_martingale_losing_streak_busts() {
        let report = run(Strategy::Martingale, 0.0, 100);
        assert_eq!(stakes(&report), vec![10.0, 20.0, 40.0, 80.0, 160.0, 320.0, 370.0]);
        assert!(report.busted);
        assert_eq!(report.rounds_played, 7);
        assert_eq!(report.final_balance, 0.0);
        assert_eq!(report.profit_pct, -100.0);
        assert_eq!(report.max_bet, 370.0);
    }

    #[test]
    fn test_fibonacci_losing_streak() {
        let report = run(Strategy::Fibonacci, 0.0, 100);
        assert_eq!(
            stakes(&report),
            vec![10.0, 10.0, 20.0, 30.0, 50.0, 80.0, 130.0, 210.0, 340.0, 120.0]
        );
        assert!(report.busted);
    }

    #[test]
    fn test_dalembert_units() {
        let losing = run(Strategy::DAlembert, 0.0, 4);
        let expected = [10.0, 11.0, 12.0, 13.0];
        for (stake, want) in stakes(&losing).iter().zip(expected) {
            assert!((stake - want).abs() < 1e-9);
        }

        let winning = run(Strategy::DAlembert, 100.0, 5);
        assert!(stakes(&winning).iter().all(|&s| s == 10.0));
    }

    #[test]
    fn test_paroli_resets_after_three_wins() {
        let report = run(Strategy::Paroli, 100.0, 6);
        assert_eq!(stakes(&report), vec![10.0, 20.0, 40.0, 10.0, 20.0, 40.0]);
        assert_eq!(report.profit, 140.0);

        let losing = run(Strategy::Paroli, 0.0, 3);
        assert_eq!(stakes(&losing), vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_labouchere_line() {
        let winning = run(Strategy::Labouchere, 100.0, 4);
        assert_eq!(stakes(&winning), vec![50.0, 50.0, 50.0, 50.0]);

        let losing = run(Strategy::Labouchere, 0.0, 4);
        assert_eq!(stakes(&losing), vec![50.0, 60.0, 70.0, 80.0]);
    }

    #[test]
    fn test_flat_report_consistency() {
        let report = run(Strategy::Flat, 47.37, 200);
        assert_eq!(report.wins + report.losses, report.rounds_played);
        assert!((report.total_wagered - 10.0 * f64::from(report.rounds_played)).abs() < 1e-9);
        assert!((report.avg_bet - 10.0).abs() < 1e-9);
        assert!(report.min_balance <= report.final_balance && report.final_balance <= report.max_balance);
        let expected_profit = 10.0 * (f64::from(report.wins) - f64::from(report.losses));
        assert!((report.profit - expected_profit).abs() < 1e-9);
    }

    #[test]
    fn test_reproducible_with_same_seed() {
        let config = StrategyConfig {
            strategy: Strategy::Fibonacci,
            ..StrategyConfig::default()
        };
        let a = simulate_strategy(&config, &mut DeterministicRng::new(5)).unwrap();
        let b = simulate_strategy(&config, &mut DeterministicRng::new(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = DeterministicRng::new(1);
        let bad = [
            StrategyConfig { starting_balance: 0.0, ..StrategyConfig::default() },
            StrategyConfig { base_bet: -5.0, ..StrategyConfig::default() },
            StrategyConfig { win_probability_pct: 101.0, ..StrategyConfig::default() },
            StrategyConfig { rounds: 0, ..StrategyConfig::default() },
        ];
        for config in bad {
            assert!(matches!(simulate_strategy(&config, &mut rng), Err(SimError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("D'Alembert".parse::<Strategy>().unwrap(), Strategy::DAlembert);
        assert_eq!("labouchere".parse::<Strategy>().unwrap(), Strategy::Labouchere);
        assert!("kelly".parse::<Strategy>().is_err());
        for s in Strategy::ALL {
            assert!(!s.description().is_empty());
        }
    }
}
