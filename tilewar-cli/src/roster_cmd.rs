//! Roster command - generate a random symmetric roster file
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: generate_roster(), report_roster()
//! - Level 3: (delegated to tilewar-core Roster)
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use tilewar_core::roster::MAX_PER_SIDE;
use tilewar_core::{Player, Roster};

use crate::query::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct RosterArgs {
    /// Output JSON file
    #[arg(long, short)]
    pub output: PathBuf,

    /// Tokens per side
    #[arg(long, default_value = "6")]
    pub per_side: usize,

    /// Roster name stored in the file
    #[arg(long, default_value = "random")]
    pub name: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run roster command
pub fn run(args: RosterArgs, seed: Option<u64>) -> Result<()> {
    let roster = generate_roster(&args, seed)?;
    roster.save(&args.output)?;

    tracing::info!(
        "Saved roster '{}' ({} tokens) to {}",
        roster.name,
        roster.tokens.len(),
        args.output.display()
    );
    report_roster(&roster);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn generate_roster(args: &RosterArgs, seed: Option<u64>) -> Result<Roster> {
    if args.per_side == 0 || args.per_side > MAX_PER_SIDE {
        bail!("--per-side must be between 1 and {}", MAX_PER_SIDE);
    }

    let mut rng = create_rng(seed);
    let roster = Roster::random(&mut rng, &args.name, args.per_side);
    roster.validate()?;
    Ok(roster)
}

fn report_roster(roster: &Roster) {
    for player in [Player::One, Player::Two] {
        println!("{}: {}", player, side_summary(roster, player));
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn side_summary(roster: &Roster, player: Player) -> String {
    roster
        .side(player)
        .map(|t| format!("{}@{}", t.name, t.pos()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================
