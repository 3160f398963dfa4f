use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use connect_four_search::config::{AppConfig, FirstMover, StrategyKind};
use connect_four_search::engine::{build_agent, resolve_first_mover, Game};
use connect_four_search::error::{MoveError, PlayError};
use connect_four_search::game::{Board, Outcome, Player, COLS};

/// Play Connect Four against a search-based AI in the terminal.
#[derive(Parser)]
#[command(name = "connect-four", about = "Play Connect Four against a search AI")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// AI strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Minimax search depth
    #[arg(long)]
    depth: Option<usize>,

    /// MCTS iterations per move
    #[arg(long)]
    iterations: Option<u64>,

    /// Time limit per AI move in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for the AI's random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Who moves first
    #[arg(long, value_enum)]
    first: Option<FirstMover>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(strategy) = self.strategy {
            config.game.strategy = strategy;
        }
        if let Some(depth) = self.depth {
            config.minimax.depth = depth;
        }
        if let Some(ms) = self.time_ms {
            match config.game.strategy {
                StrategyKind::Minimax => config.minimax.time_limit_ms = Some(ms),
                StrategyKind::Mcts => {
                    config.mcts.time_limit_ms = Some(ms);
                    config.mcts.iterations = None;
                }
            }
        }
        if let Some(iterations) = self.iterations {
            config.mcts.iterations = Some(iterations);
        }
        if let Some(seed) = self.seed {
            config.game.seed = Some(seed);
        }
        if let Some(first) = self.first {
            config.game.first_mover = first;
        }
    }
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
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let mut rng = match config.game.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let first = resolve_first_mover(config.game.first_mover, &mut rng);
    let mut game = Game::new(build_agent(&config), first);

    println!("Connect Four: you are X, the {} AI is O.", game.ai_name());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        println!();
        print_board(game.board());

        match game.to_move() {
            Player::Human => {
                print!("Your move (1-{COLS}, q to quit): ");
                io::stdout().flush()?;

                let Some(line) = lines.next() else {
                    println!();
                    return Ok(());
                };
                let line = line.context("reading stdin")?;
                let input = line.trim();
                if input.eq_ignore_ascii_case("q") {
                    println!("Bye.");
                    return Ok(());
                }

                let Some(column) = parse_column(input) else {
                    println!("Enter a column number from 1 to {COLS}.");
                    continue;
                };
                match game.play_human(column) {
                    Ok(_) => {}
                    Err(PlayError::Move(MoveError::ColumnFull { column })) => {
                        println!("Column {} is full, try another.", column + 1);
                    }
                    Err(PlayError::Move(err)) => println!("{err}, try again."),
                    Err(err) => return Err(err.into()),
                }
            }
            Player::Ai => {
                let column = game.play_ai().context("AI move failed")?;
                println!("{} plays column {}", game.ai_name(), column + 1);
                if let Some(report) = game.ai_report() {
                    println!("  {report}");
                }
            }
        }
    }

    println!();
    print_board(game.board());
    match game.outcome() {
        Outcome::HumanWin => println!("You win!"),
        Outcome::AiWin => println!("The AI wins."),
        Outcome::Draw => println!("It's a draw."),
        Outcome::Ongoing => {}
    }
    Ok(())
}

/// Parse a 1-based column number into a 0-based index.
fn parse_column(input: &str) -> Option<usize> {
    let column: usize = input.parse().ok()?;
    (1..=COLS).contains(&column).then(|| column - 1)
}

fn print_board(board: &Board) {
    println!("{board}");
    let labels: Vec<String> = (1..=COLS).map(|c| c.to_string()).collect();
    println!("{}", labels.join(" "));
}
