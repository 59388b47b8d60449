//! Provably Fair CLI
//!
//! Commit to a server seed, derive outcomes, verify reveals and run the
//! fair-seeded simulations from the command line.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use provably_fair::{
    core::{entropy, stats::{Histogram, RollingWindow, Summary, DEFAULT_BUCKETS, DEFAULT_WINDOW}},
    fair::{self, ClientSeed, Commitment, FairSession, Nonce, OutcomeKind, ServerSeed, SessionReveal},
    sim::{
        self,
        blackjack::{self, Difficulty},
        odds::{self, CasinoGame},
        strategy::{self, Strategy, StrategyConfig},
    },
    DeterministicRng, OutcomeConfig, SimConfig, VERSION,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Provably fair outcome derivation and verification")]
struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the SHA-256 commitment of a server seed (generates one if omitted).
    Commit {
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Derive one outcome.
    Derive {
        #[arg(short, long)]
        server: String,
        #[arg(short, long)]
        client: String,
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        nonce: String,
        #[arg(short, long, default_value = "dice")]
        kind: String,
    },
    /// Check a revealed server seed against a commitment.
    Verify {
        #[arg(short, long)]
        server: String,
        #[arg(long)]
        commitment: String,
    },
    /// Show a worked example with fixed inputs.
    Example,
    /// Play consecutive rounds of one session, then reveal.
    Stream {
        #[command(flatten)]
        seeds: SeedArgs,
        #[arg(short, long, default_value = "coin")]
        kind: String,
        #[arg(long, default_value = "10")]
        count: u64,
        #[arg(long, default_value = "0")]
        interval_ms: u64,
        /// Write the reveal JSON here.
        #[arg(long)]
        reveal_out: Option<PathBuf>,
    },
    /// Audit a reveal JSON file.
    Audit {
        file: PathBuf,
        /// Commitment published before play (defaults to the one in the file).
        #[arg(long)]
        commitment: Option<String>,
    },
    /// Draw OS-random integers and summarize them.
    Rng {
        #[arg(long, default_value = "1")]
        min: i64,
        #[arg(long, default_value = "100")]
        max: i64,
        #[arg(long, default_value = "1000")]
        count: usize,
        #[arg(long, default_value_t = DEFAULT_BUCKETS)]
        buckets: u32,
        /// Also summarize the most recent N samples.
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
    },
    /// Expected value and house edge of a casino bet, plus a simulation.
    Odds {
        #[arg(short, long, default_value = "roulette")]
        game: String,
        /// Bet name from the game's table (defaults to the first).
        #[arg(short, long)]
        bet: Option<String>,
        #[arg(long, default_value = "100")]
        amount: f64,
        #[arg(long)]
        bets: Option<u32>,
        #[command(flatten)]
        seeds: SeedArgs,
    },
    /// Simulate a betting strategy.
    Strategy {
        #[arg(short, long, default_value = "martingale")]
        strategy: String,
        #[arg(long, default_value = "10")]
        base_bet: f64,
        #[arg(long, default_value = "47.37")]
        probability: f64,
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long)]
        balance: Option<f64>,
        #[command(flatten)]
        seeds: SeedArgs,
    },
    /// Blackjack basic strategy: advise on a hand, or deal practice hands.
    Blackjack {
        /// Player cards, e.g. "A,7".
        #[arg(long)]
        hand: Option<String>,
        /// Dealer up-card.
        #[arg(long)]
        dealer: Option<String>,
        #[arg(long, default_value = "5")]
        deals: u32,
        #[arg(long, default_value = "basic")]
        difficulty: String,
        /// Ask for an action on each deal (read from stdin) and keep score.
        #[arg(long, conflicts_with_all = ["hand", "dealer"])]
        quiz: bool,
        #[command(flatten)]
        seeds: SeedArgs,
    },
}

/// Seeds for the simulation PRNG. Missing seeds are generated.
#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    server: Option<String>,
    #[arg(long)]
    client: Option<String>,
    #[arg(long, default_value = "0")]
    nonce: u64,
}

impl SeedArgs {
    fn seeds(&self) -> Result<(ServerSeed, ClientSeed)> {
        let server = match &self.server {
            Some(s) => ServerSeed::new(s.as_str())?,
            None => ServerSeed::generate(),
        };
        let client = match &self.client {
            Some(c) => ClientSeed::new(c.as_str())?,
            None => ClientSeed::generate(),
        };
        Ok((server, client))
    }

    fn rng(&self) -> Result<DeterministicRng> {
        let (server, client) = self.seeds()?;
        let nonce = Nonce::new(self.nonce);
        info!(
            commitment = %Commitment::new(&server),
            client_seed = %client,
            nonce = %nonce,
            "simulation seeded"
        );
        Ok(sim::seeded_rng(&server, &client, nonce))
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();
    info!("provably-fair v{}", VERSION);

    match cli.command {
        Command::Commit { seed } => cmd_commit(cli.json, seed),
        Command::Derive { server, client, nonce, kind } => cmd_derive(cli.json, &server, &client, &nonce, &kind),
        Command::Verify { server, commitment } => cmd_verify(cli.json, &server, &commitment),
        Command::Example => cmd_example(cli.json),
        Command::Stream { seeds, kind, count, interval_ms, reveal_out } => {
            cmd_stream(cli.json, &seeds, &kind, count, interval_ms, reveal_out)
        }
        Command::Audit { file, commitment } => cmd_audit(cli.json, &file, commitment.as_deref()),
        Command::Rng { min, max, count, buckets, window } => cmd_rng(cli.json, min, max, count, buckets, window),
        Command::Odds { game, bet, amount, bets, seeds } => cmd_odds(cli.json, &game, bet.as_deref(), amount, bets, &seeds),
        Command::Strategy { strategy, base_bet, probability, rounds, balance, seeds } => {
            cmd_strategy(cli.json, &strategy, base_bet, probability, rounds, balance, &seeds)
        }
        Command::Blackjack { hand, dealer, deals, difficulty, quiz, seeds } => {
            if quiz {
                cmd_blackjack_quiz(cli.json, deals, &difficulty, &seeds)
            } else {
                cmd_blackjack(cli.json, hand.as_deref(), dealer.as_deref(), deals, &difficulty, &seeds)
            }
        }
    }
}

#[derive(Serialize)]
struct CommitOutput {
    server_seed: Option<String>,
    commitment: Commitment,
}

fn cmd_commit(json: bool, seed: Option<String>) -> Result<()> {
    let (server, generated) = match seed {
        Some(s) => (ServerSeed::new(s)?, false),
        None => (ServerSeed::generate(), true),
    };
    let output = CommitOutput {
        // A generated seed must be shown once so the operator can keep it.
        server_seed: generated.then(|| server.as_str().to_string()),
        commitment: Commitment::new(&server),
    };
    emit(json, &output, || match &output.server_seed {
        Some(s) => format!("server seed: {}\ncommitment:  {}", s, output.commitment),
        None => output.commitment.to_string(),
    })
}

fn cmd_derive(json: bool, server: &str, client: &str, nonce: &str, kind: &str) -> Result<()> {
    let config = OutcomeConfig::from_env()?;
    let kind: OutcomeKind = kind.parse()?;
    let nonce: Nonce = nonce.parse()?;
    let derivation = fair::derive_outcome(
        &ServerSeed::new(server)?,
        &ClientSeed::new(client)?,
        nonce,
        &config.spec_for(kind),
    )?;
    emit(json, &derivation, || {
        format!(
            "input:   {}\ndigest:  {}\n{}: {}",
            derivation.combined_input,
            derivation.digest,
            kind.game_name(),
            derivation.outcome
        )
    })
}

#[derive(Serialize)]
struct VerifyOutput {
    valid: bool,
    computed: Option<Commitment>,
}

fn cmd_verify(json: bool, server: &str, commitment: &str) -> Result<()> {
    let valid = fair::verify_hex(server, commitment);
    let output = VerifyOutput {
        valid,
        computed: fair::commit(server).ok(),
    };
    emit(json, &output, || {
        if valid {
            "valid: server seed matches commitment".to_string()
        } else {
            "INVALID: server seed does not match commitment".to_string()
        }
    })?;
    if !valid {
        bail!("verification failed");
    }
    Ok(())
}

#[derive(Serialize)]
struct ExampleRound {
    kind: OutcomeKind,
    outcome: fair::Outcome,
}

#[derive(Serialize)]
struct ExampleOutput {
    server_seed: &'static str,
    client_seed: &'static str,
    nonce: u64,
    commitment: Commitment,
    digest: fair::DerivedDigest,
    leading_integer: u32,
    rounds: Vec<ExampleRound>,
}

fn cmd_example(json: bool) -> Result<()> {
    const SERVER: &str = "s3cr3t";
    const CLIENT: &str = "abc";

    let config = OutcomeConfig::from_env()?;
    let mut rounds = Vec::new();
    let mut digest = None;
    for kind in OutcomeKind::ALL {
        let derivation = fair::derive(SERVER, CLIENT, 0, &config.spec_for(kind))?;
        digest = Some(derivation.digest);
        rounds.push(ExampleRound { kind, outcome: derivation.outcome });
    }
    let digest = digest.context("no outcome kinds")?;

    let output = ExampleOutput {
        server_seed: SERVER,
        client_seed: CLIENT,
        nonce: 0,
        commitment: fair::commit(SERVER)?,
        digest,
        leading_integer: fair::outcome::leading_integer_of(digest.as_bytes()),
        rounds,
    };
    emit(json, &output, || {
        let mut text = format!(
            "server seed: {}\nclient seed: {}\nnonce:       0\ncommitment:  {}\ndigest:      {}\nleading:     {}\n",
            output.server_seed, output.client_seed, output.commitment, output.digest, output.leading_integer
        );
        for round in &output.rounds {
            text.push_str(&format!("{:<9} {}\n", round.kind.game_name(), round.outcome));
        }
        text.trim_end().to_string()
    })
}

fn cmd_stream(
    json: bool,
    seeds: &SeedArgs,
    kind: &str,
    count: u64,
    interval_ms: u64,
    reveal_out: Option<PathBuf>,
) -> Result<()> {
    let config = OutcomeConfig::from_env()?;
    let kind: OutcomeKind = kind.parse()?;
    let spec = config.spec_for(kind);
    if seeds.nonce != 0 {
        warn!(nonce = seeds.nonce, "sessions always start at nonce 0; --nonce ignored");
    }

    let (server, client) = seeds.seeds()?;
    let mut session = FairSession::new(server, client);
    if !json {
        println!("commitment: {}", session.commitment());
    }

    for i in 0..count {
        let derivation = session.next_outcome(&spec)?;
        if json {
            println!("{}", serde_json::to_string(&derivation)?);
        } else {
            println!("#{:<6} {}  {}", derivation.nonce, derivation.digest, derivation.outcome);
        }
        if interval_ms > 0 && i + 1 < count {
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    let reveal = session.reveal();
    let reveal_json = reveal.to_json()?;
    match reveal_out {
        Some(path) => {
            std::fs::write(&path, &reveal_json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "reveal written");
        }
        None if !json => println!("server seed: {}", reveal.server_seed.as_str()),
        None => println!("{}", serde_json::to_string(&reveal)?),
    }
    Ok(())
}

fn cmd_audit(json: bool, file: &Path, commitment: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let reveal = SessionReveal::from_json(&text)?;
    let report = match commitment {
        Some(hex_str) => reveal.audit(&hex_str.parse()?),
        None => reveal.self_audit(),
    };

    emit(json, &report, || {
        let mut text = format!(
            "rounds:     {}\ncommitment: {}\nvalid:      {}",
            report.rounds.len(),
            report.expected_commitment,
            report.valid
        );
        for err in &report.errors {
            text.push_str(&format!("\n  - {}", err));
        }
        text
    })?;
    if !report.valid {
        bail!("audit failed with {} error(s)", report.errors.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct RngOutput {
    summary: Option<Summary>,
    window: Option<Summary>,
    histogram: Histogram,
}

fn cmd_rng(json: bool, min: i64, max: i64, count: usize, buckets: u32, window: usize) -> Result<()> {
    if min > max {
        bail!("min {} is greater than max {}", min, max);
    }
    let samples = (0..count)
        .map(|_| entropy::secure_int_range(min, max))
        .collect::<Result<Vec<i64>, _>>()?;
    let mut recent = RollingWindow::new(window);
    for &v in &samples {
        recent.push(v);
    }
    let output = RngOutput {
        summary: Summary::from_samples(&samples),
        window: recent.summary(),
        histogram: Histogram::from_samples(min, max, buckets, &samples),
    };
    emit(json, &output, || {
        let mut text = match &output.summary {
            Some(summary) => summary.to_string(),
            None => "no samples".to_string(),
        };
        if let Some(last) = output.window.as_ref().filter(|w| w.count < samples.len()) {
            text.push_str(&format!("\nlast {}: {}", last.count, last));
        }
        for bucket in output.histogram.buckets() {
            text.push_str(&format!("\n{:>12} {:>6}", bucket.label(), bucket.count));
        }
        text
    })
}

#[derive(Serialize)]
struct OddsOutput {
    game: CasinoGame,
    bet: odds::Bet,
    amount: f64,
    expected_value: f64,
    house_edge_pct: f64,
    rtp_pct: f64,
    game_house_edge_pct: f64,
    final_balance: Option<f64>,
    wins: usize,
    simulated: usize,
}

fn cmd_odds(json: bool, game: &str, bet: Option<&str>, amount: f64, bets: Option<u32>, seeds: &SeedArgs) -> Result<()> {
    let game: CasinoGame = game.parse()?;
    let bet = match bet {
        Some(name) => game.bet(name).with_context(|| format!("{} has no bet named {:?}", game, name))?,
        None => game.bets().into_iter().next().context("empty bet table")?,
    };
    let count = match bets {
        Some(n) => n,
        None => SimConfig::from_env()?.rounds,
    };

    let mut rng = seeds.rng()?;
    let results = odds::simulate_bets(&bet, amount, count, &mut rng);
    let output = OddsOutput {
        game,
        expected_value: odds::expected_value(&bet, amount),
        house_edge_pct: odds::house_edge_pct(&bet, amount),
        rtp_pct: odds::rtp_pct(&bet, amount),
        game_house_edge_pct: game.house_edge_pct(),
        final_balance: results.last().map(|r| r.balance),
        wins: results.iter().filter(|r| r.won).count(),
        simulated: results.len(),
        bet,
        amount,
    };
    emit(json, &output, || {
        format!(
            "{} / {} (pays {}:1, {:.2}%)\nstake:        {:.2}\nEV:           {:+.2}\nhouse edge:   {:.2}% (game: {:.2}%)\nRTP:          {:.2}%\nsimulated:    {} bets, {} wins, net {:+.2}",
            output.game,
            output.bet.name,
            output.bet.payout,
            output.bet.probability_pct,
            output.amount,
            output.expected_value,
            output.house_edge_pct,
            output.game_house_edge_pct,
            output.rtp_pct,
            output.simulated,
            output.wins,
            output.final_balance.unwrap_or(0.0)
        )
    })
}

fn cmd_strategy(
    json: bool,
    strategy: &str,
    base_bet: f64,
    probability: f64,
    rounds: Option<u32>,
    balance: Option<f64>,
    seeds: &SeedArgs,
) -> Result<()> {
    let defaults = SimConfig::from_env()?;
    let strategy: Strategy = strategy.parse()?;
    let config = StrategyConfig {
        strategy,
        starting_balance: balance.unwrap_or(defaults.starting_balance),
        base_bet,
        win_probability_pct: probability,
        rounds: rounds.unwrap_or(defaults.rounds),
    };

    let mut rng = seeds.rng()?;
    let report = strategy::simulate_strategy(&config, &mut rng)?;
    emit(json, &report, || {
        format!(
            "{}: {}\nrounds:        {}{}\nfinal balance: {:.2} ({:+.2}, {:+.2}%)\nrange:         {:.2} – {:.2}\nwagered:       {:.2} (avg {:.2}, max {:.2})\nwins/losses:   {}/{} ({:.2}%)\nROI:           {:+.2}%",
            report.strategy,
            report.strategy.description(),
            report.rounds_played,
            if report.busted { " (busted)" } else { "" },
            report.final_balance,
            report.profit,
            report.profit_pct,
            report.min_balance,
            report.max_balance,
            report.total_wagered,
            report.avg_bet,
            report.max_bet,
            report.wins,
            report.losses,
            report.win_rate_pct,
            report.roi_pct
        )
    })
}

#[derive(Serialize)]
struct BlackjackAdvice {
    player: Vec<blackjack::Rank>,
    dealer: blackjack::Rank,
    value: blackjack::HandValue,
    action: blackjack::Action,
    explanation: String,
}

impl BlackjackAdvice {
    fn new(player: Vec<blackjack::Rank>, dealer: blackjack::Rank) -> Self {
        let action = blackjack::correct_action(&player, dealer);
        Self {
            value: blackjack::hand_value(&player),
            explanation: blackjack::explanation(&player, action),
            player,
            dealer,
            action,
        }
    }

    fn line(&self) -> String {
        let cards: Vec<&str> = self.player.iter().map(|r| r.label()).collect();
        format!(
            "{:<8} ({}{}) vs {:<2} → {:<9} {}",
            cards.join(","),
            if self.value.soft { "soft " } else { "" },
            self.value.total,
            self.dealer,
            self.action,
            self.explanation
        )
    }
}

fn cmd_blackjack(
    json: bool,
    hand: Option<&str>,
    dealer: Option<&str>,
    deals: u32,
    difficulty: &str,
    seeds: &SeedArgs,
) -> Result<()> {
    let advice = match (hand, dealer) {
        (Some(hand), Some(dealer)) => vec![BlackjackAdvice::new(blackjack::parse_hand(hand)?, dealer.parse()?)],
        (None, None) => {
            let difficulty: Difficulty = difficulty.parse()?;
            let mut trainer = blackjack::Trainer::new(seeds.rng()?, difficulty);
            (0..deals)
                .map(|_| {
                    let deal = trainer.deal();
                    BlackjackAdvice::new(deal.player, deal.dealer)
                })
                .collect()
        }
        _ => bail!("--hand and --dealer must be given together"),
    };

    emit(json, &advice, || {
        advice.iter().map(BlackjackAdvice::line).collect::<Vec<_>>().join("\n")
    })
}

#[derive(Serialize)]
struct QuizOutput {
    difficulty: Difficulty,
    score: blackjack::Score,
    accuracy_pct: f64,
}

fn cmd_blackjack_quiz(json: bool, deals: u32, difficulty: &str, seeds: &SeedArgs) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse()?;
    let mut trainer = blackjack::Trainer::new(seeds.rng()?, difficulty);
    // Prompts on stderr, score on stdout.
    let score = trainer.quiz(deals, io::stdin().lock(), io::stderr())?;
    info!(correct = score.correct, incorrect = score.incorrect, "quiz finished");

    let output = QuizOutput {
        difficulty,
        score,
        accuracy_pct: score.accuracy_pct(),
    };
    emit(json, &output, || {
        format!(
            "score: {}/{} ({:.1}%), best streak {}",
            score.correct,
            score.correct + score.incorrect,
            output.accuracy_pct,
            score.max_streak
        )
    })
}
