//! Blackjack Basic Strategy
//!
//! Hand valuation, the basic-strategy charts and a trainer that deals hands
//! and scores answers.
//!
//! Chart lookup order: pairs, then soft totals 13–20, then hard totals 8–17.
//! Anything else stands on 17+ and hits below.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use super::SimError;
use crate::core::rng::DeterministicRng;

/// Card rank. Suits do not matter to strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    /// 2
    Two,
    /// 3
    Three,
    /// 4
    Four,
    /// 5
    Five,
    /// 6
    Six,
    /// 7
    Seven,
    /// 8
    Eight,
    /// 9
    Nine,
    /// 10
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
}

impl Rank {
    /// All thirteen ranks.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Point value with the ace counted high.
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    /// Card label, `2`–`10`, `J`, `Q`, `K`, `A`.
    pub fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    /// Chart column for a dealer up-card: 2..=10 → 0..=8, ace → 9.
    fn dealer_column(self) -> usize {
        match self {
            Rank::Ace => 9,
            other => usize::from(other.value()) - 2,
        }
    }

    fn random(rng: &mut DeterministicRng) -> Rank {
        Rank::ALL[rng.next_int(Rank::ALL.len() as u32) as usize]
    }
}

impl FromStr for Rank {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        Rank::ALL
            .iter()
            .copied()
            .find(|r| r.label() == label)
            .ok_or_else(|| SimError::UnknownCard(s.to_string()))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Parse a comma- or space-separated hand such as `"A,7"`.
pub fn parse_hand(text: &str) -> Result<Vec<Rank>, SimError> {
    let hand = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Rank>, _>>()?;
    if hand.is_empty() {
        return Err(SimError::EmptyHand);
    }
    Ok(hand)
}

/// Hand total after ace demotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandValue {
    /// Best total.
    pub total: u8,
    /// An ace is still counted as 11.
    pub soft: bool,
}

/// Count aces as 11, demoting them to 1 while the total exceeds 21.
pub fn hand_value(hand: &[Rank]) -> HandValue {
    let mut total: u16 = 0;
    let mut aces: u8 = 0;

    for &card in hand {
        total += u16::from(card.value());
        if card == Rank::Ace {
            aces += 1;
        }
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    HandValue {
        total: total.min(255) as u8,
        soft: aces > 0,
    }
}

/// Player decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Take a card.
    Hit,
    /// Take no more cards.
    Stand,
    /// Double the stake and take one card.
    Double,
    /// Split a pair into two hands.
    Split,
    /// Forfeit half the stake.
    Surrender,
}

impl Action {
    /// Every action.
    pub const ALL: [Action; 5] = [Action::Hit, Action::Stand, Action::Double, Action::Split, Action::Surrender];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Double => "double",
            Action::Split => "split",
            Action::Surrender => "surrender",
        }
    }

    fn from_chart(code: u8) -> Action {
        match code {
            b'S' => Action::Stand,
            b'D' => Action::Double,
            b'P' => Action::Split,
            b'R' => Action::Surrender,
            _ => Action::Hit,
        }
    }
}

impl FromStr for Action {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hit" | "h" => Ok(Action::Hit),
            "stand" | "s" => Ok(Action::Stand),
            "double" | "d" => Ok(Action::Double),
            "split" | "p" => Ok(Action::Split),
            "surrender" | "r" => Ok(Action::Surrender),
            _ => Err(SimError::InvalidConfig(format!("unknown action: {}", s))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// Charts: one row per player hand, one column per dealer up-card
// (2 3 4 5 6 7 8 9 10 A). H hit, S stand, D double, P split, R surrender.

/// Hard totals 8..=17.
const HARD: [&[u8; 10]; 10] = [
    b"HHHHHHHHHH", // 8
    b"HDDDDHHHHH", // 9
    b"DDDDDDDDHH", // 10
    b"DDDDDDDDDH", // 11
    b"HHSSSHHHHH", // 12
    b"SSSSSHHHHH", // 13
    b"SSSSSHHHHH", // 14
    b"SSSSSHHHRH", // 15
    b"SSSSSHHRRR", // 16
    b"SSSSSSSSSS", // 17
];

/// Soft totals 13..=20.
const SOFT: [&[u8; 10]; 8] = [
    b"HHHDDHHHHH", // 13
    b"HHHDDHHHHH", // 14
    b"HHDDDHHHHH", // 15
    b"HHDDDHHHHH", // 16
    b"HDDDDHHHHH", // 17
    b"SDDDDSSHHH", // 18
    b"SSSSDSSSSS", // 19
    b"SSSSSSSSSS", // 20
];

/// Pair row for two identical ranks. Face-card pairs have no row.
fn pair_row(rank: Rank) -> Option<&'static [u8; 10]> {
    Some(match rank {
        Rank::Ace => b"PPPPPPPPPP",
        Rank::Ten => b"SSSSSSSSSS",
        Rank::Nine => b"PPPPPSPPSS",
        Rank::Eight => b"PPPPPPPPPP",
        Rank::Seven => b"PPPPPPHHHH",
        Rank::Six => b"PPPPPHHHHH",
        Rank::Five => b"DDDDDDDDHH",
        Rank::Four => b"HHHPPHHHHH",
        Rank::Three | Rank::Two => b"PPPPPPHHHH",
        Rank::Jack | Rank::Queen | Rank::King => return None,
    })
}

/// The basic-strategy play for `hand` against `dealer_up`.
pub fn correct_action(hand: &[Rank], dealer_up: Rank) -> Action {
    let column = dealer_up.dealer_column();

    if let [a, b] = hand {
        if a == b {
            if let Some(row) = pair_row(*a) {
                return Action::from_chart(row[column]);
            }
        }
    }

    let HandValue { total, soft } = hand_value(hand);

    if soft && (13..=20).contains(&total) {
        return Action::from_chart(SOFT[usize::from(total - 13)][column]);
    }
    if (8..=17).contains(&total) {
        return Action::from_chart(HARD[usize::from(total - 8)][column]);
    }

    if total >= 17 {
        Action::Stand
    } else {
        Action::Hit
    }
}

/// Short reason for an action.
pub fn explanation(hand: &[Rank], action: Action) -> String {
    let total = hand_value(hand).total;
    match action {
        Action::Hit => format!("With {}, you need to draw another card to improve your hand.", total),
        Action::Stand => format!("{} is strong enough. Drawing risks busting.", total),
        Action::Double => {
            "This is a strong hand to double down: the expected value is highest when doubling your bet."
                .to_string()
        }
        Action::Split => match hand.first() {
            Some(card) => format!("Always split {}s. Each hand has better potential separately.", card),
            None => "Each hand has better potential separately.".to_string(),
        },
        Action::Surrender => {
            "Dealer has a strong card and your hand is weak. Surrender to minimize losses.".to_string()
        }
    }
}

/// Which hands the trainer deals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Two random cards.
    #[default]
    Basic,
    /// Mostly pairs.
    Pairs,
    /// Two random cards.
    Mixed,
}

impl FromStr for Difficulty {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Difficulty::Basic),
            "pairs" => Ok(Difficulty::Pairs),
            "mixed" => Ok(Difficulty::Mixed),
            _ => Err(SimError::InvalidConfig(format!("unknown difficulty: {}", s))),
        }
    }
}

/// A dealt training hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Player's two cards.
    pub player: Vec<Rank>,
    /// Dealer up-card.
    pub dealer: Rank,
}

/// Trainer score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Correct answers.
    pub correct: u32,
    /// Incorrect answers.
    pub incorrect: u32,
    /// Current run of correct answers.
    pub streak: u32,
    /// Longest run so far.
    pub max_streak: u32,
}

impl Score {
    /// Percentage correct, 0 before any answer.
    pub fn accuracy_pct(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(total) * 100.0
        }
    }
}

/// Result of one answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Was the answer right?
    pub correct: bool,
    /// The chart's play.
    pub correct_action: Action,
    /// Reason, given on a wrong answer.
    pub explanation: Option<String>,
}

/// Deals hands and keeps score.
#[derive(Debug)]
pub struct Trainer {
    rng: DeterministicRng,
    difficulty: Difficulty,
    score: Score,
}

impl Trainer {
    /// New trainer drawing from `rng`.
    pub fn new(rng: DeterministicRng, difficulty: Difficulty) -> Self {
        Self {
            rng,
            difficulty,
            score: Score::default(),
        }
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Deal the next hand.
    pub fn deal(&mut self) -> Deal {
        let player = match self.difficulty {
            Difficulty::Pairs if self.rng.next_f64() > 0.3 => {
                let card = Rank::random(&mut self.rng);
                vec![card, card]
            }
            _ => vec![Rank::random(&mut self.rng), Rank::random(&mut self.rng)],
        };
        let dealer = Rank::random(&mut self.rng);
        Deal { player, dealer }
    }

    /// Score an answer for `deal`.
    pub fn answer(&mut self, deal: &Deal, action: Action) -> Feedback {
        let correct_action = correct_action(&deal.player, deal.dealer);
        let correct = action == correct_action;

        if correct {
            self.score.correct += 1;
            self.score.streak += 1;
            self.score.max_streak = self.score.max_streak.max(self.score.streak);
        } else {
            self.score.incorrect += 1;
            self.score.streak = 0;
        }

        Feedback {
            correct,
            correct_action,
            explanation: (!correct).then(|| explanation(&deal.player, correct_action)),
        }
    }

    /// Deal `rounds` hands, reading one action per line from `input`.
    ///
    /// Prompts and feedback go to `out`. Unrecognised lines are asked again.
    /// Stops early at end of input.
    pub fn quiz<R: BufRead, W: Write>(&mut self, rounds: u32, mut input: R, mut out: W) -> io::Result<Score> {
        let mut line = String::new();
        for _ in 0..rounds {
            let deal = self.deal();
            let cards: Vec<&str> = deal.player.iter().map(|r| r.label()).collect();
            loop {
                write!(out, "{} vs {} > ", cards.join(","), deal.dealer)?;
                out.flush()?;
                line.clear();
                if input.read_line(&mut line)? == 0 {
                    return Ok(self.score);
                }
                let action = match line.parse::<Action>() {
                    Ok(action) => action,
                    Err(_) => {
                        writeln!(out, "answer with hit, stand, double, split or surrender")?;
                        continue;
                    }
                };
                let feedback = self.answer(&deal, action);
                match feedback.explanation {
                    None => writeln!(out, "correct (streak {})", self.score.streak)?,
                    Some(why) => writeln!(out, "wrong: {} ({})", feedback.correct_action, why)?,
                }
                break;
            }
        }
        Ok(self.score)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;

    #[test]
    fn test_hand_value() {
        assert_eq!(hand_value(&[Ace, King]), HandValue { total: 21, soft: true });
        assert_eq!(hand_value(&[Ace, Ace]), HandValue { total: 12, soft: true });
        assert_eq!(hand_value(&[Ace, Ace, Ace]), HandValue { total: 13, soft: true });
        assert_eq!(hand_value(&[Ace, Six, Nine]), HandValue { total: 16, soft: false });
        assert_eq!(hand_value(&[King, Queen, Five]), HandValue { total: 25, soft: false });
        assert_eq!(hand_value(&[]), HandValue { total: 0, soft: false });
    }

    #[test]
    fn test_pairs() {
        assert_eq!(correct_action(&[Ace, Ace], Ten), Action::Split);
        assert_eq!(correct_action(&[Eight, Eight], Ace), Action::Split);
        assert_eq!(correct_action(&[Nine, Nine], Seven), Action::Stand);
        assert_eq!(correct_action(&[Five, Five], Six), Action::Double);
        assert_eq!(correct_action(&[Four, Four], Five), Action::Split);
        assert_eq!(correct_action(&[Ten, Ten], Six), Action::Stand);
        // Face pairs fall through to hard 20.
        assert_eq!(correct_action(&[King, King], Six), Action::Stand);
    }

    #[test]
    fn test_soft_hands() {
        assert_eq!(correct_action(&[Ace, Seven], Three), Action::Double);
        assert_eq!(correct_action(&[Ace, Seven], Nine), Action::Hit);
        assert_eq!(correct_action(&[Ace, Eight], Six), Action::Double);
        assert_eq!(correct_action(&[Ace, Two], Five), Action::Double);
        assert_eq!(correct_action(&[Ace, Two], Two), Action::Hit);
    }

    #[test]
    fn test_hard_hands() {
        assert_eq!(correct_action(&[Ten, Six], Ten), Action::Surrender);
        assert_eq!(correct_action(&[Ten, Five], Ten), Action::Surrender);
        assert_eq!(correct_action(&[Ten, Five], Ace), Action::Hit);
        assert_eq!(correct_action(&[Ten, Two], Four), Action::Stand);
        assert_eq!(correct_action(&[Ten, Two], Two), Action::Hit);
        assert_eq!(correct_action(&[Six, Five], Ace), Action::Hit);
        assert_eq!(correct_action(&[Six, Five], Queen), Action::Double);
        assert_eq!(correct_action(&[Five, Four], Three), Action::Double);
        assert_eq!(correct_action(&[Two, Three], Six), Action::Hit);
        assert_eq!(correct_action(&[Ten, Eight], Ace), Action::Stand);
        // Ace demoted: hard 16.
        assert_eq!(correct_action(&[Ace, Six, Nine], Nine), Action::Surrender);
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_hand("A,7").unwrap(), vec![Ace, Seven]);
        assert_eq!(parse_hand("10 j q").unwrap(), vec![Ten, Jack, Queen]);
        assert_eq!(parse_hand(" , "), Err(SimError::EmptyHand));
        assert_eq!(parse_hand("A,1"), Err(SimError::UnknownCard("1".into())));
        assert_eq!("Surrender".parse::<Action>().unwrap(), Action::Surrender);
        assert_eq!("p".parse::<Action>().unwrap(), Action::Split);
    }

    #[test]
    fn test_every_deal_has_a_valid_answer() {
        for dealer in Rank::ALL {
            for a in Rank::ALL {
                for b in Rank::ALL {
                    let action = correct_action(&[a, b], dealer);
                    if action == Action::Split {
                        assert_eq!(a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_trainer_scoring() {
        let mut trainer = Trainer::new(DeterministicRng::new(3), Difficulty::Basic);

        for _ in 0..5 {
            let deal = trainer.deal();
            let right = correct_action(&deal.player, deal.dealer);
            let feedback = trainer.answer(&deal, right);
            assert!(feedback.correct);
            assert!(feedback.explanation.is_none());
        }
        assert_eq!(trainer.score().streak, 5);

        let deal = trainer.deal();
        let right = correct_action(&deal.player, deal.dealer);
        let wrong = Action::ALL.into_iter().find(|a| *a != right).unwrap();
        let feedback = trainer.answer(&deal, wrong);
        assert!(!feedback.correct);
        assert_eq!(feedback.correct_action, right);
        assert!(feedback.explanation.is_some());

        let score = trainer.score();
        assert_eq!(score.correct, 5);
        assert_eq!(score.incorrect, 1);
        assert_eq!(score.streak, 0);
        assert_eq!(score.max_streak, 5);
        assert!((score.accuracy_pct() - 500.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_pairs_difficulty_favours_pairs() {
        let mut trainer = Trainer::new(DeterministicRng::new(8), Difficulty::Pairs);
        let pairs = (0..1_000)
            .map(|_| trainer.deal())
            .filter(|d| d.player[0] == d.player[1])
            .count();
        // ~70% forced pairs plus chance pairs among the rest.
        assert!(pairs > 600, "pairs dealt: {}", pairs);
    }

    #[test]
    fn test_quiz_reads_answers() {
        // A second trainer on the same seed deals the same hands.
        let mut preview = Trainer::new(DeterministicRng::new(21), Difficulty::Basic);
        let first = preview.deal();
        let second = preview.deal();
        let right = correct_action(&first.player, first.dealer);
        let wrong = Action::ALL
            .into_iter()
            .find(|a| *a != correct_action(&second.player, second.dealer))
            .unwrap();

        let input = format!("fold\n{}\n{}\n", right, wrong.as_str().to_uppercase());
        let mut out = Vec::new();
        let mut trainer = Trainer::new(DeterministicRng::new(21), Difficulty::Basic);
        let score = trainer.quiz(3, input.as_bytes(), &mut out).unwrap();

        assert_eq!(score.correct, 1);
        assert_eq!(score.incorrect, 1);
        assert_eq!(score, trainer.score());

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("answer with hit"));
        assert!(transcript.contains("correct (streak 1)"));
        assert!(transcript.contains("wrong: "));
    }
}
