//! Play command - engine self-play matches or a game against a human
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), play_interactive(), report_results()
//! - Level 3: play_single_game(), handle_input(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use tilewar_core::{Controller, Engine, GameSession, GameStatus, Player};

use crate::query::{load_engine, PositionArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Search depth for Player 1's engine
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Search depth for Player 2's engine (default: --depth)
    #[arg(long)]
    pub p2_depth: Option<u32>,

    /// Play this side yourself, reading moves from stdin
    #[arg(long)]
    pub human: Option<Player>,

    /// Number of self-play games (alternates who moves first)
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Turn limit per game; reaching it is a draw
    #[arg(long, default_value = "100")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    first: Player,
    status: GameStatus,
    turns: u32,
    moves: Vec<String>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    p1_wins: usize,
    p2_wins: usize,
    draws: usize,
    avg_turns: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// With `--human` this is one interactive game; otherwise the engine plays
/// itself `--games` times and the results are reported.
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let engine = load_engine(&args.position, seed)?;

    if let Some(human) = args.human {
        return play_interactive(engine, human, &args);
    }

    tracing::info!(
        "Starting self-play: {} games, depth {} vs {}",
        args.games,
        args.depth,
        args.p2_depth.unwrap_or(args.depth)
    );

    let results = play_match(&engine, &args)?;
    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all self-play games
fn play_match(engine: &Engine, args: &PlayArgs) -> Result<MatchResults> {
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        // Alternate the opening side for fairness
        let first = if game_num % 2 == 1 { Player::Two } else { Player::One };
        let record = play_single_game(engine.clone(), first, game_num + 1, args)?;

        tracing::info!(
            "Game {}: {} ({} turns)",
            record.game_number,
            describe_status(record.status),
            record.turns
        );

        games.push(record);
    }

    Ok(compute_match_statistics(games))
}

/// Human vs engine on stdin/stdout
fn play_interactive(engine: Engine, human: Player, args: &PlayArgs) -> Result<()> {
    let mut session = GameSession::new(engine, Player::One, controllers(args, Some(human)))
        .with_max_turns(Some(args.max_turns));

    println!("You are {}. Enter moves as name:x,y; also: moves <name>, hint, board, quit", human);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let seen = session.history().len();
        let status = session.run_until_human()?;
        for record in &session.history()[seen..] {
            println!("{} plays {}", record.player, record.mv);
        }

        let to_move = match status {
            GameStatus::Ongoing { to_move } => to_move,
            finished => {
                print!("{}", session.engine().board());
                println!("Game over: {}", describe_status(finished));
                return Ok(());
            }
        };

        print!("{}{} > ", session.engine().board(), to_move);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        if !handle_input(&mut session, line?.trim()) {
            return Ok(());
        }
    }
}

/// Report match results
fn report_results(results: &MatchResults, args: &PlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one engine-vs-engine game
fn play_single_game(
    engine: Engine,
    first: Player,
    game_number: usize,
    args: &PlayArgs,
) -> Result<GameRecord> {
    let mut session = GameSession::new(engine, first, controllers(args, None))
        .with_max_turns(Some(args.max_turns));

    let status = session.run_until_human()?;

    Ok(GameRecord {
        game_number,
        first,
        status,
        turns: session.turn(),
        moves: session.history().iter().map(|r| r.mv.to_string()).collect(),
    })
}

/// Handle one line of human input; `false` ends the game
fn handle_input(session: &mut GameSession, line: &str) -> bool {
    match line {
        "" => {}
        "quit" | "exit" => return false,
        "board" => println!("{}", session.engine().get_board_state()),
        "hint" => {
            let depth = session.engine().search_config().depth;
            match session.engine().get_best_move(session.to_move(), depth) {
                Some(mv) => println!("Hint: {}", mv),
                None => println!("No legal moves"),
            }
        }
        _ if line.starts_with("moves ") => {
            let name = line["moves ".len()..].trim();
            let targets: Vec<String> = session
                .engine()
                .get_possible_moves(name)
                .iter()
                .map(|p| p.to_string())
                .collect();
            println!("{}: {}", name, targets.join("  "));
        }
        _ => match session.submit(line) {
            Ok(outcome) if outcome.is_applied() => {}
            Ok(outcome) => println!("Rejected: {:?}", outcome),
            Err(e) => println!("Error: {}", e),
        },
    }
    true
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let wins = |player: Player| {
        games
            .iter()
            .filter(|g| g.status == GameStatus::Won { winner: player })
            .count()
    };
    let p1_wins = wins(Player::One);
    let p2_wins = wins(Player::Two);
    let draws = games.iter().filter(|g| g.status == GameStatus::Draw).count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    MatchResults {
        games,
        p1_wins,
        p2_wins,
        draws,
        avg_turns,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn controllers(args: &PlayArgs, human: Option<Player>) -> [Controller; 2] {
    let side = |player: Player, depth: u32| {
        if human == Some(player) {
            Controller::Human
        } else {
            Controller::Engine { depth }
        }
    };
    [
        side(Player::One, args.depth),
        side(Player::Two, args.p2_depth.unwrap_or(args.depth)),
    ]
}

fn describe_status(status: GameStatus) -> String {
    match status {
        GameStatus::Ongoing { to_move } => format!("ongoing, {} to move", to_move),
        GameStatus::Won { winner } => format!("{} wins", winner),
        GameStatus::Draw => "draw".to_string(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame<'a> {
        game_number: usize,
        first: Player,
        result: String,
        turns: u32,
        moves: &'a [String],
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        total_games: usize,
        p1_wins: usize,
        p2_wins: usize,
        draws: usize,
        avg_turns: f32,
        games: Vec<JsonGame<'a>>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        p1_wins: results.p1_wins,
        p2_wins: results.p2_wins,
        draws: results.draws,
        avg_turns: results.avg_turns,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first: g.first,
                result: describe_status(g.status),
                turns: g.turns,
                moves: &g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games:   {}", total);
    println!("Player 1 wins: {} ({:.1}%)", results.p1_wins, percent(results.p1_wins, total));
    println!("Player 2 wins: {} ({:.1}%)", results.p2_wins, percent(results.p2_wins, total));
    println!("Draws:         {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg turns:     {:.1}", results.avg_turns);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {} ({} first): {} in {} turns",
            game.game_number,
            game.first,
            describe_status(game.status),
            game.turns
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_core::Roster;

    fn args() -> PlayArgs {
        PlayArgs {
            position: PositionArgs::default(),
            depth: 1,
            p2_depth: Some(2),
            human: None,
            games: 2,
            max_turns: 12,
            json: false,
        }
    }

    fn record(n: usize, status: GameStatus, turns: u32) -> GameRecord {
        GameRecord {
            game_number: n,
            first: Player::One,
            status,
            turns,
            moves: vec![],
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.p1_wins, 0);
        assert_eq!(results.p2_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, GameStatus::Won { winner: Player::One }, 10),
            record(2, GameStatus::Won { winner: Player::Two }, 20),
            record(3, GameStatus::Draw, 30),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.p1_wins, 1);
        assert_eq!(results.p2_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_turns, 20.0);
    }

    #[test]
    fn test_controllers() {
        let args = args();
        assert_eq!(
            controllers(&args, None),
            [Controller::Engine { depth: 1 }, Controller::Engine { depth: 2 }]
        );
        assert_eq!(
            controllers(&args, Some(Player::Two)),
            [Controller::Engine { depth: 1 }, Controller::Human]
        );
    }

    #[test]
    fn test_play_match_respects_turn_limit() {
        let engine = Roster::default().to_engine().unwrap();
        let results = play_match(&engine, &args()).unwrap();

        assert_eq!(results.games.len(), 2);
        assert_eq!(results.games[1].first, Player::Two);
        for game in &results.games {
            assert!(game.turns <= 12);
            assert_eq!(game.moves.len(), game.turns as usize);
        }
    }

    #[test]
    fn test_handle_input() {
        let engine = Roster::default().to_engine().unwrap();
        let humans = [Controller::Human, Controller::Human];
        let mut session = GameSession::new(engine, Player::One, humans);

        assert!(handle_input(&mut session, "hint"));
        assert!(handle_input(&mut session, "not a move"));
        assert_eq!(session.turn(), 0);

        let mv = session.engine().get_best_move(Player::One, 1).unwrap();
        assert!(handle_input(&mut session, &mv));
        assert_eq!(session.turn(), 1);
        assert!(!handle_input(&mut session, "quit"));
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(GameStatus::Draw), "draw");
        assert_eq!(describe_status(GameStatus::Won { winner: Player::Two }), "Player 2 wins");
    }
}
