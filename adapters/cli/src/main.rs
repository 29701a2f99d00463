#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for playing Grid Tactics against the AI.

mod config;
mod console;
mod scenario_transfer;

use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tactics_core::{CounterTiming, Team, MAX_GRID_COLUMNS};
use tactics_system_session::Session;
use tracing_subscriber::EnvFilter;

use crate::{config::Overrides, console::Console, scenario_transfer::ScenarioSnapshot};

/// Play Grid Tactics against the AI from the terminal.
#[derive(Parser, Debug)]
#[command(name = "tactics")]
#[command(about = "Play Grid Tactics against the AI from the terminal")]
struct Args {
    /// TOML file holding match settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of grid rows
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rows: Option<u32>,

    /// Number of grid columns (at most 26)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_GRID_COLUMNS)))]
    columns: Option<u32>,

    /// Share of cells to turn into obstacles, in percent
    #[arg(long)]
    obstacles: Option<u32>,

    /// Random seed for deterministic matches
    #[arg(long)]
    seed: Option<u64>,

    /// Side that places and moves first
    #[arg(long, value_enum)]
    first: Option<SideArg>,

    /// When counterattack damage reaches the attacker
    #[arg(long, value_enum)]
    counters: Option<CounterArg>,

    /// Read console commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Start from a shared scenario string printed by `export`
    #[arg(long)]
    scenario: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Player,
    Ai,
}

impl From<SideArg> for Team {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Player => Team::Player,
            SideArg::Ai => Team::Ai,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CounterArg {
    Immediate,
    Deferred,
}

impl From<CounterArg> for CounterTiming {
    fn from(timing: CounterArg) -> Self {
        match timing {
            CounterArg::Immediate => CounterTiming::Immediate,
            CounterArg::Deferred => CounterTiming::Deferred,
        }
    }
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            rows: self.rows,
            columns: self.columns,
            obstacle_percentage: self.obstacles,
            seed: self.seed,
            first_team: self.first.map(Team::from),
            counter_timing: self.counters.map(CounterTiming::from),
        }
    }
}

/// Entry point for the Grid Tactics command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let loaded = config::load(args.config.as_deref())?;
    let config = config::apply(loaded, &args.overrides())?;

    let mut opening = Vec::new();
    let session = match &args.scenario {
        Some(text) => {
            let scenario = ScenarioSnapshot::decode(text).context("invalid --scenario string")?;
            let grid = scenario.grid().context("invalid --scenario layout")?;
            if scenario.units.is_empty() {
                Session::with_grid(grid, &config, &mut opening)
            } else {
                Session::with_deployment(grid, &config, &scenario.deployment(), &mut opening)
                    .context("scenario units do not fit the board")?
            }
        }
        None => Session::new(&config, &mut opening),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut console = Console::new(session, &opening, &mut out)?;

    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            console.run(BufReader::new(file), &mut out)
        }
        None => console.run(io::stdin().lock(), &mut out),
    }
}
