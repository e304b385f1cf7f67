//! Benchmark command - search and self-play timing
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: run_search_benchmarks(), run_game_benchmark(), report_results()
//! - Level 3: benchmark_search(), benchmark_games()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use tilewar_core::{Controller, Engine, GameSession, GameStatus, Player};

use crate::query::{load_engine, PositionArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Maximum search depth to test
    #[arg(long, default_value = "4")]
    pub depth: u32,

    /// Self-play games to time (0 skips the game benchmark)
    #[arg(long, default_value = "4")]
    pub games: usize,

    /// Search depth used in self-play games
    #[arg(long, default_value = "2")]
    pub game_depth: u32,

    /// Turn limit per self-play game
    #[arg(long, default_value = "60")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results of a single benchmark run
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    runs: usize,
    /// Nodes for searches, turns for self-play
    count: u64,
    total_time: Duration,
    rate: f64,
    notes: String,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Time a Player 1 search from the start position at each depth
/// 2. Time a batch of self-play games
/// 3. Report all results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!("Starting benchmarks: max depth {}, {} games", args.depth, args.games);

    let engine = load_engine(&args.position, seed)?;
    let mut all_results = AllResults {
        results: Vec::new(),
        system_info: get_system_info(),
    };

    run_search_benchmarks(&engine, &args, &mut all_results);
    if args.games > 0 {
        run_game_benchmark(&engine, &args, &mut all_results)?;
    }

    report_results(&all_results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Search the start position at depths 1..=max
fn run_search_benchmarks(engine: &Engine, args: &BenchmarkArgs, results: &mut AllResults) {
    for depth in 1..=args.depth {
        tracing::info!("Benchmarking alpha-beta at depth {}...", depth);
        results.results.push(benchmark_search(engine, depth));
    }
}

/// Time complete self-play games
fn run_game_benchmark(
    engine: &Engine,
    args: &BenchmarkArgs,
    results: &mut AllResults,
) -> Result<()> {
    tracing::info!(
        "Benchmarking {} self-play games at depth {}...",
        args.games,
        args.game_depth
    );
    let result = benchmark_games(engine, args.games, args.game_depth, args.max_turns)?;
    results.results.push(result);
    Ok(())
}

/// Report all benchmark results
fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// One root search for Player 1
fn benchmark_search(engine: &Engine, depth: u32) -> BenchmarkResult {
    let start = Instant::now();
    let result = engine.best_move(Player::One, depth);
    let total_time = start.elapsed();

    BenchmarkResult {
        name: format!("Alpha-Beta D{}", depth),
        runs: 1,
        count: result.nodes,
        total_time,
        rate: per_second(result.nodes, total_time),
        notes: match result.best {
            Some(mv) => format!("best {} ({})", mv, result.score),
            None => "no legal move".to_string(),
        },
    }
}

/// Engine-vs-engine games from the same start position
fn benchmark_games(
    engine: &Engine,
    games: usize,
    depth: u32,
    max_turns: u32,
) -> Result<BenchmarkResult> {
    let mut total_turns = 0u32;
    let mut decided = 0usize;

    let start = Instant::now();
    for _ in 0..games {
        let mut session = GameSession::new(
            engine.clone(),
            Player::One,
            [Controller::Engine { depth }, Controller::Engine { depth }],
        )
        .with_max_turns(Some(max_turns));

        if let GameStatus::Won { .. } = session.run_until_human()? {
            decided += 1;
        }
        total_turns += session.turn();
    }
    let total_time = start.elapsed();

    Ok(BenchmarkResult {
        name: format!("Self-play D{}", depth),
        runs: games,
        count: u64::from(total_turns),
        total_time,
        rate: per_second(u64::from(total_turns), total_time),
        notes: format!(
            "Avg turns/game: {:.1}, decided: {}/{}",
            total_turns as f64 / games.max(1) as f64,
            decided,
            games
        ),
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Get system information string
fn get_system_info() -> String {
    format!(
        "tilewar {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!(
            "{}m {:.1}s",
            d.as_secs() / 60,
            (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0
        )
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark<'a> {
        name: &'a str,
        runs: usize,
        count: u64,
        total_time_ms: f64,
        per_second: f64,
        notes: &'a str,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        system_info: &'a str,
        benchmarks: Vec<JsonBenchmark<'a>>,
    }

    let output = JsonOutput {
        system_info: &results.system_info,
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                name: &r.name,
                runs: r.runs,
                count: r.count,
                total_time_ms: r.total_time.as_secs_f64() * 1000.0,
                per_second: r.rate,
                notes: &r.notes,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &AllResults) {
    println!("\n=== TILEWAR Benchmark Results ===");
    println!("System: {}\n", results.system_info);

    println!(
        "{:<16} {:>6} {:>10} {:>12} {:>12}  {}",
        "Benchmark", "Runs", "Count", "Total Time", "Count/s", "Notes"
    );
    println!("{}", "-".repeat(84));

    for r in &results.results {
        println!(
            "{:<16} {:>6} {:>10} {:>12} {:>12.0}  {}",
            r.name,
            r.runs,
            r.count,
            format_duration(r.total_time),
            r.rate,
            r.notes
        );
    }
    println!("\nCount is nodes for searches and turns for self-play.");
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_core::Roster;

    #[test]
    fn test_format_duration() {
        assert!(format_duration(Duration::from_micros(10)).contains("us"));
        assert!(format_duration(Duration::from_millis(500)).contains("ms"));
        assert!(format_duration(Duration::from_secs(5)).contains("s"));
        assert!(format_duration(Duration::from_secs(90)).contains("m"));
    }

    #[test]
    fn test_per_second_zero_elapsed() {
        assert_eq!(per_second(100, Duration::ZERO), 0.0);
        assert_eq!(per_second(100, Duration::from_secs(2)), 50.0);
    }

    #[test]
    fn test_benchmark_search_grows_with_depth() {
        let engine = Roster::default().to_engine().unwrap();
        let shallow = benchmark_search(&engine, 1);
        let deeper = benchmark_search(&engine, 2);
        assert!(shallow.count > 0);
        assert!(deeper.count > shallow.count);
        assert!(shallow.notes.starts_with("best "));
    }

    #[test]
    fn test_benchmark_games() {
        let engine = Roster::default().to_engine().unwrap();
        let result = benchmark_games(&engine, 2, 1, 10).unwrap();
        assert_eq!(result.runs, 2);
        assert!(result.count <= 20);
    }

    #[test]
    fn test_get_system_info() {
        let info = get_system_info();
        assert!(info.contains("tilewar"));
        assert!(info.contains("CPUs"));
    }
}
