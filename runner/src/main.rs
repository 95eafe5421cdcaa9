// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing, benchmarking and inspecting the AI
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use gambit_agents::config::load_config;
use gambit_agents::{AiConfig, Difficulty};
use gambit_arena::database::Database;
use gambit_arena::runner::{play_encounter, setup_encounter, ArenaConfig};
use gambit_arena::{run_batch, ArenaError};
use gambit_engine::engine;
use gambit_engine::types::Faction;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "gambit_agents=info,gambit_arena=info,gambit_engine=warn";

#[derive(Parser)]
#[command(name = "gambit", about = "Gambit tactical AI lab")]
struct Cli {
    /// AI config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the config's difficulty: easy, normal or hard
    #[arg(short, long, global = true)]
    difficulty: Option<Difficulty>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one encounter and print the action log
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 60)]
        max_rounds: u32,
        /// Print log entries as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Run a batch of encounters and store the results
    Arena {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 60)]
        max_rounds: u32,
        #[arg(long, default_value = "results.db")]
        db: PathBuf,
    },
    /// Show win rates per difficulty from the database
    Stats {
        #[arg(long, default_value = "results.db")]
        db: PathBuf,
    },
    /// Plan one enemy turn and dump the decisions and debug snapshot
    Debug {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ArenaError> {
    let mut ai = match &cli.config {
        Some(path) => load_config(path)?,
        None => AiConfig::default(),
    };
    if let Some(difficulty) = cli.difficulty {
        ai.difficulty = difficulty;
    }

    match cli.command {
        Commands::Play { seed, max_rounds, json } => cmd_play(arena_config(ai, max_rounds), seed, json),
        Commands::Arena { games, seed, max_rounds, db } => cmd_arena(arena_config(ai, max_rounds), games, seed, &db),
        Commands::Stats { db } => cmd_stats(&db),
        Commands::Debug { seed } => cmd_debug(arena_config(ai, 1), seed),
    }
}

fn arena_config(ai: AiConfig, max_rounds: u32) -> ArenaConfig {
    ArenaConfig { ai, max_rounds, ..ArenaConfig::default() }
}

fn cmd_play(config: ArenaConfig, seed: u64, json: bool) -> Result<(), ArenaError> {
    println!("=== Gambit encounter: seed={}, difficulty={} ===\n", seed, config.ai.difficulty);

    let result = play_encounter(&config, seed, |entry| {
        if json {
            match serde_json::to_string(entry) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("cannot encode log entry: {}", e),
            }
        } else {
            println!("[round {:>2}] {:6} {}  =>  {:?}", entry.round, entry.side.to_string(), entry.action, entry.outcome);
        }
    })?;

    println!();
    match result.winner {
        Some(faction) => println!("Winner: {} after {} rounds", faction, result.rounds),
        None => println!("Draw after {} rounds", result.rounds),
    }
    println!("Survivors: enemy {}, player {}", result.enemy_survivors, result.player_survivors);
    let c = result.ai_actions;
    println!(
        "AI actions: {} moves, {} attacks, {} abilities, {} waits ({} rejected)",
        c.moves, c.attacks, c.abilities, c.waits, c.rejected
    );
    Ok(())
}

fn cmd_arena(config: ArenaConfig, games: u32, first_seed: u64, db_path: &Path) -> Result<(), ArenaError> {
    println!("=== Arena: {} encounters, difficulty={} ===\n", games, config.ai.difficulty);

    let db = Database::open(db_path)?;
    let seeds: Vec<u64> = (0..games as u64).map(|g| first_seed + g * 1000).collect();

    let mut wins = [0u32; 2];
    let mut draws = 0u32;
    let mut errors = 0u32;
    for (seed, outcome) in seeds.iter().zip(run_batch(&config, &seeds)) {
        match outcome {
            Ok(result) => {
                match result.winner {
                    Some(Faction::Enemy) => wins[0] += 1,
                    Some(Faction::Player) => wins[1] += 1,
                    None => draws += 1,
                }
                db.store_encounter(&result)?;
            }
            Err(e) => {
                errors += 1;
                error!(seed, "encounter failed: {}", e);
            }
        }
    }

    info!(games, errors, "arena batch finished");
    let pct = |n: u32| if games > 0 { n as f64 / games as f64 * 100.0 } else { 0.0 };
    println!("--- Summary ({} encounters, {} errors) ---", games, errors);
    println!("  enemy wins : {:>4} ({:.1}%)", wins[0], pct(wins[0]));
    println!("  player wins: {:>4} ({:.1}%)", wins[1], pct(wins[1]));
    println!("  draws      : {:>4} ({:.1}%)", draws, pct(draws));
    println!("\nResults saved to: {}", db_path.display());
    println!("Total encounters in DB: {}", db.encounter_count()?);
    Ok(())
}

fn cmd_stats(db_path: &Path) -> Result<(), ArenaError> {
    let db = Database::open(db_path)?;
    let stats = db.difficulty_stats()?;
    if stats.is_empty() {
        println!("No encounters found. Run the arena first.");
        return Ok(());
    }
    println!("=== Win rates by difficulty ===\n");
    println!("{:<10} {:>10} {:>10} {:>10} {:>8} {:>10}", "Difficulty", "Encounters", "Enemy %", "Player %", "Draws", "Rounds");
    println!("{}", "-".repeat(63));
    for s in &stats {
        let player_rate = if s.encounters > 0 { s.player_wins as f64 / s.encounters as f64 } else { 0.0 };
        println!(
            "{:<10} {:>10} {:>9.1}% {:>9.1}% {:>8} {:>10.1}",
            s.difficulty,
            s.encounters,
            s.enemy_win_rate() * 100.0,
            player_rate * 100.0,
            s.draws,
            s.mean_rounds,
        );
    }
    Ok(())
}

fn cmd_debug(config: ArenaConfig, seed: u64) -> Result<(), ArenaError> {
    let (mut ai, mut state) = setup_encounter(&config, seed)?;
    engine::begin_side_turn(&mut state, Faction::Enemy);
    let own = state.living(Faction::Enemy);
    let opposing = state.living(Faction::Player);
    let actions = ai.process_turn(&own, &opposing, &state.grid);

    println!("=== Enemy turn 1 (seed={}, difficulty={}) ===\n", seed, ai.difficulty());
    for action in &actions {
        println!("  {}", action);
    }
    println!();
    match serde_json::to_string_pretty(&ai.debug_info()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("cannot encode debug info: {}", e),
    }
    Ok(())
}
