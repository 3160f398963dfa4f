use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use connect_four_search::arena::run_arena;
use connect_four_search::config::{AppConfig, OpponentKind, StrategyKind};
use connect_four_search::engine::{build_agent, build_opponent};

/// Pit the configured AI against an opponent agent and time its moves.
#[derive(Parser)]
#[command(name = "arena", about = "Play automated Connect Four matches")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// AI strategy under test
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Opponent agent
    #[arg(long, value_enum)]
    opponent: Option<OpponentKind>,

    /// Number of games to play
    #[arg(long)]
    games: Option<usize>,

    /// Minimax search depth
    #[arg(long)]
    depth: Option<usize>,

    /// MCTS iterations per move
    #[arg(long)]
    iterations: Option<u64>,

    /// MCTS time limit per move in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for both agents
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(strategy) = cli.strategy {
        config.game.strategy = strategy;
    }
    if let Some(opponent) = cli.opponent {
        config.arena.opponent = opponent;
    }
    if let Some(games) = cli.games {
        config.arena.games = games;
    }
    if let Some(depth) = cli.depth {
        config.minimax.depth = depth;
    }
    if let Some(ms) = cli.time_ms {
        config.mcts.time_limit_ms = Some(ms);
        config.mcts.iterations = None;
    }
    if let Some(iterations) = cli.iterations {
        config.mcts.iterations = Some(iterations);
    }
    if let Some(seed) = cli.seed {
        config.game.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;

    let mut ai = build_agent(&config);
    let mut opponent = build_opponent(&config);
    log::info!(
        "arena: {} vs {} for {} games",
        ai.name(),
        opponent.name(),
        config.arena.games
    );

    let report = run_arena(ai.as_mut(), opponent.as_mut(), config.arena.games)
        .context("arena game failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        println!("{report}");
    }
    Ok(())
}
