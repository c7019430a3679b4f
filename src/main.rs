//! Pocketduel - two-player creature card matches with search-based agents.
//!
//! Runs one match between two selectors and prints the outcome.
//!
//! ## Usage
//!
//! ```text
//! pocketduel [OPTIONS]
//!
//! Options:
//!   --p1 KIND        Selector for player 1: random | heuristic | mcts | human
//!   --p2 KIND        Selector for player 2 (same kinds)
//!   --seed N         PRNG seed (default 0: randomly chosen)
//!   --sims N         MCTS simulation budget (default 100)
//!   --depth N        MCTS rollout depth in decisions (default 10)
//!   --turn-limit N   Turn ceiling before a draw (default 100)
//!   --json           Print a JSON match summary at the end
//! ```

use std::env;
use std::io::{BufRead, Write};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use pocketduel::{
    ActionSelector, DecisionRequest, DecisionSource, HeuristicSelector, InteractiveSelector,
    MatchConfig, MatchCursor, MatchEvent, MatchState, MctsConfig, MctsSelector, Outcome, Player,
    PlayerId, UniformRandomSelector, cards,
};

/// Reads choices from stdin; EOF resolves like a timeout.
struct StdinSource;

impl DecisionSource for StdinSource {
    fn prompt(&mut self, request: &DecisionRequest) -> Option<usize> {
        println!("\n[{:?}] choose an action:", request.context);
        for (index, candidate) in request.candidates.iter().enumerate() {
            println!("  {index}: {}", candidate.description);
        }
        print!("> ");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            // Unparsable input reads as out-of-range, which re-prompts.
            Ok(_) => Some(line.trim().parse().unwrap_or(usize::MAX)),
        }
    }
}

struct Options {
    p1: String,
    p2: String,
    seed: u64,
    sims: u32,
    depth: u32,
    turn_limit: u32,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            p1: "mcts".to_string(),
            p2: "random".to_string(),
            seed: 0,
            sims: 100,
            depth: 10,
            turn_limit: 100,
            json: false,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match arg.as_str() {
            "--p1" => options.p1 = value("--p1")?,
            "--p2" => options.p2 = value("--p2")?,
            "--seed" => {
                options.seed = value("--seed")?
                    .parse()
                    .map_err(|_| "invalid --seed".to_string())?
            }
            "--sims" => {
                options.sims = value("--sims")?
                    .parse()
                    .map_err(|_| "invalid --sims".to_string())?
            }
            "--depth" => {
                options.depth = value("--depth")?
                    .parse()
                    .map_err(|_| "invalid --depth".to_string())?
            }
            "--turn-limit" => {
                options.turn_limit = value("--turn-limit")?
                    .parse()
                    .map_err(|_| "invalid --turn-limit".to_string())?
            }
            "--json" => options.json = true,
            "--help" | "-h" => {
                println!(
                    "pocketduel [--p1 KIND] [--p2 KIND] [--seed N] [--sims N] \
                     [--depth N] [--turn-limit N] [--json]\n\
                     KIND: random | heuristic | mcts | human"
                );
                std::process::exit(0);
            }
            other => return Err(format!("unknown option {other}")),
        }
    }
    Ok(options)
}

fn build_selector(
    kind: &str,
    seed: u64,
    options: &Options,
) -> Result<Box<dyn ActionSelector>, String> {
    match kind {
        "random" => Ok(Box::new(UniformRandomSelector::new(seed))),
        "heuristic" => Ok(Box::new(HeuristicSelector::new(seed))),
        "mcts" => Ok(Box::new(MctsSelector::new(
            MctsConfig {
                simulations: options.sims,
                rollout_depth: options.depth,
                ..MctsConfig::default()
            },
            seed,
        ))),
        "human" => Ok(Box::new(InteractiveSelector::new(StdinSource))),
        other => Err(format!("unknown selector kind {other}")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        }
    };

    let seed = if options.seed == 0 {
        rand::rng().next_u64()
    } else {
        options.seed
    };
    let mut rng = StdRng::seed_from_u64(seed);

    let config = MatchConfig {
        turn_limit: options.turn_limit,
        ..MatchConfig::default()
    };
    let state = MatchState::new(
        Player::new(PlayerId::from_index(0), "Alice", cards::grass_deck()),
        Player::new(PlayerId::from_index(1), "Bob", cards::lightning_deck()),
        config,
    );

    let mut selector1 = match build_selector(&options.p1, seed ^ 0xA11CE, &options) {
        Ok(selector) => selector,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        }
    };
    let mut selector2 = match build_selector(&options.p2, seed ^ 0xB0B, &options) {
        Ok(selector) => selector,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        }
    };

    println!(
        "pocketduel: Alice ({}) vs Bob ({}), seed {seed}",
        options.p1, options.p2
    );

    let mut selectors: [&mut dyn ActionSelector; 2] =
        [selector1.as_mut(), selector2.as_mut()];
    let mut cursor = MatchCursor::new(state, &mut rng);
    let outcome = loop {
        match cursor.advance(&mut rng) {
            MatchEvent::Finished(outcome) => break outcome,
            MatchEvent::Decision(request) => {
                let index =
                    selectors[request.player.index()].choose_action(&cursor, &request);
                if let Err(error) = cursor.resume(index, &mut rng) {
                    eprintln!("selector defect: {error:?}");
                    std::process::exit(1);
                }
            }
        }
    };

    let state = cursor.state();
    match outcome {
        Outcome::Winner(id) => println!("winner: {}", state.player(id).name),
        Outcome::Draw => println!("draw (turn limit reached)"),
        Outcome::InProgress => unreachable!("the cursor only finishes terminal"),
    }
    println!(
        "turns: {}, points: {} {} - {} {}",
        state.turn,
        state.players[0].name,
        state.players[0].points,
        state.players[1].name,
        state.players[1].points,
    );

    #[cfg(feature = "serialization")]
    if options.json {
        let summary = serde_json::json!({
            "seed": seed,
            "turns": state.turn,
            "winner": outcome.winner().map(|id| state.player(id).name.clone()),
            "points": [state.players[0].points, state.players[1].points],
        });
        println!("{summary}");
    }
}
