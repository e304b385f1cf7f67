//! TILEWAR CLI - Command-line interface
//!
//! Commands:
//! - moves / best-move / state: query a position
//! - play: engine self-play or human vs engine
//! - roster: generate a random roster
//! - benchmark: search timing per depth

mod benchmark;
mod play_cmd;
mod query;
mod roster_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilewar")]
#[command(about = "TILEWAR 5x5 capture game engine")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the legal targets of a token
    Moves(query::MovesArgs),
    /// Search the best move for a side
    BestMove(query::BestMoveArgs),
    /// Print the serialized board state
    State(query::StateArgs),
    /// Play a game (engine vs engine, or against a human)
    Play(play_cmd::PlayArgs),
    /// Generate a random symmetric roster
    Roster(roster_cmd::RosterArgs),
    /// Time the search at increasing depths
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves(args) => query::run_moves(args, cli.seed),
        Commands::BestMove(args) => query::run_best_move(args, cli.seed),
        Commands::State(args) => query::run_state(args, cli.seed),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Roster(args) => roster_cmd::run(args, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
    }
}
