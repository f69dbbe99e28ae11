//! Headless battle simulator.
//!
//! Loads the content tables from a data directory, rolls a party against a
//! wave of enemies and plays the battle at a fixed 60 Hz timestep. With
//! `--qte` the party is player-controlled: its turns take the AI's suggestion
//! and an autopilot answers every timing challenge at the requested grade.
//!
//! ```bash
//! cargo run -p battle-sim -- --seed 7 --wave 5 --difficulty hard --weather storm --qte good
//! RUST_LOG=battle_core=debug cargo run -p battle-sim -- --json > log.json
//! ```
mod autopilot;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use autopilot::Grade;
use battle_content::ContentFactory;
use battle_core::{Difficulty, WeatherKind};
use clap::Parser;
use session::{Report, SimOptions};

/// Runs one battle headless and prints its event log
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Headless battle simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Seed for team rolls and the battle itself
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Wave number; every fifth wave brings the boss
    #[arg(long, default_value_t = 1)]
    wave: u32,

    /// easy, normal, hard or nightmare
    #[arg(long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// clear, rain, storm, fog or snow
    #[arg(long, default_value_t = WeatherKind::Clear)]
    weather: WeatherKind,

    /// Control the party and answer its timing challenges at this grade;
    /// without it the party fights on its own
    #[arg(long, value_enum)]
    qte: Option<Grade>,

    /// Let the party open turns with team combos
    #[arg(long)]
    combos: bool,

    /// Directory holding battle.toml and the RON tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let content = ContentFactory::new(&cli.data_dir)
        .load_all()
        .with_context(|| format!("Failed to load content from {}", cli.data_dir.display()))?;

    let options = SimOptions {
        seed: cli.seed,
        wave: cli.wave,
        difficulty: cli.difficulty,
        weather: cli.weather,
        grade: cli.qte,
        combos: cli.combos,
        max_ticks: cli.max_ticks,
    };
    let report = session::run(&content, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!(
        "seed {} | wave {} | {} | {}",
        report.seed, report.wave, report.difficulty, report.weather
    );
    println!();
    for event in &report.events {
        println!("{:>8.3}s  turn {:>3}  {:?}", event.timestamp, event.turn, event.kind);
    }
    println!();
    println!("Outcome: {} after {} ticks", report.outcome, report.ticks);
    match &report.rewards {
        Some(rewards) => {
            println!("Rewards: {} exp, {} gold", rewards.exp, rewards.gold);
            for item in &rewards.items {
                println!("  - {item}");
            }
        }
        None => println!("Rewards: none"),
    }
}
