//! Query commands - inspect a position without playing it
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_moves(), run_best_move(), run_state() - orchestration
//! - Level 2: load_engine(), load_heuristics()
//! - Level 3: (delegated to tilewar-core Engine)
//! - Level 4: output formatting

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tilewar_core::{Engine, Heuristics, Player, Roster, SearchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Where the position comes from
#[derive(Args, Clone, Debug, Default)]
pub struct PositionArgs {
    /// Roster JSON file (default: built-in six-a-side roster)
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Random symmetric roster with this many tokens per side (uses --seed)
    #[arg(long, value_name = "N", conflicts_with = "roster")]
    pub random: Option<usize>,

    /// Board state applied on top of the roster (`name:x,y;...`)
    #[arg(long)]
    pub state: Option<String>,
}

#[derive(Args)]
pub struct MovesArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Token name
    #[arg(long)]
    pub token: String,
}

#[derive(Args)]
pub struct BestMoveArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Side to move (`1`, `2`, `Player 1`, ...)
    #[arg(long)]
    pub player: Player,

    /// Search depth in plies
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Count tokens only, ignore cell and kind weights
    #[arg(long, conflicts_with = "heuristics")]
    pub material_only: bool,

    /// Heuristics JSON file
    #[arg(long, value_name = "FILE")]
    pub heuristics: Option<PathBuf>,

    /// Stop searching after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StateArgs {
    #[command(flatten)]
    pub position: PositionArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run_moves(args: MovesArgs, seed: Option<u64>) -> Result<()> {
    let engine = load_engine(&args.position, seed)?;
    if engine.token_position(&args.token).is_none() {
        bail!("Token '{}' is not on the board", args.token);
    }

    for pos in engine.get_possible_moves(&args.token) {
        println!("{}", pos);
    }
    Ok(())
}

pub fn run_best_move(args: BestMoveArgs, seed: Option<u64>) -> Result<()> {
    let mut search = SearchConfig::with_depth(args.depth);
    search.time_limit_ms = args.time_limit_ms;

    let engine = load_engine(&args.position, seed)?
        .with_heuristics(load_heuristics(&args)?)
        .with_search_config(search);

    let result = engine.best_move(args.player, args.depth);
    let mv = result.best.as_ref().map(|m| m.to_string());

    if args.json {
        let output = serde_json::json!({
            "player": args.player,
            "depth": args.depth,
            "move": mv,
            "score": result.score,
            "nodes": result.nodes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match mv {
            Some(mv) => println!("{}", mv),
            None => println!("none"),
        }
    }
    Ok(())
}

pub fn run_state(args: StateArgs, seed: Option<u64>) -> Result<()> {
    let engine = load_engine(&args.position, seed)?;
    println!("{}", engine.get_board_state());
    print!("{}", engine.board());
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Roster (file, random or built-in) plus an optional board state
pub fn load_engine(args: &PositionArgs, seed: Option<u64>) -> Result<Engine> {
    let roster = match (&args.roster, args.random) {
        (Some(path), _) => Roster::load(path)?,
        (None, Some(per_side)) => {
            let mut rng = create_rng(seed);
            Roster::random(&mut rng, "random", per_side)
        }
        (None, None) => Roster::default(),
    };
    tracing::debug!("Using roster '{}' ({} tokens)", roster.name, roster.tokens.len());

    let mut engine = roster.to_engine()?;
    if let Some(state) = &args.state {
        engine.handle_board_state(state)?;
    }
    Ok(engine)
}

fn load_heuristics(args: &BestMoveArgs) -> Result<Heuristics> {
    if args.material_only {
        return Ok(Heuristics::material_only());
    }
    match &args.heuristics {
        Some(path) => Heuristics::load(path),
        None => Ok(Heuristics::default()),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
