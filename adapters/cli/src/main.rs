#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Maze Runners match in the terminal.

mod console;
mod match_file;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use maze_runners_core::{Difficulty, RosterSize, CATALOG};
use maze_runners_rendering::TextRenderer;
use maze_runners_system_bootstrap::Bootstrap;
use maze_runners_system_turn_engine::TurnEngine;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    console::{LoggingAudio, StdinInput},
    match_file::MatchFile,
};

#[derive(Debug, Parser)]
#[command(name = "maze-runners", about = "Two-player turn-based maze race", version)]
struct Cli {
    /// TOML file with match settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Difficulty preset: tutorial, normal or nightmare
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Tokens per player (1 to 5)
    #[arg(short = 'n', long, value_parser = parse_roster_size)]
    roster_size: Option<RosterSize>,

    /// Seed for maze generation and every random effect
    #[arg(long)]
    seed: Option<u64>,

    /// Name of player one
    #[arg(long)]
    player1: Option<String>,

    /// Name of player two
    #[arg(long)]
    player2: Option<String>,

    /// Comma-separated tokens drafted by player one
    #[arg(long, value_delimiter = ',')]
    picks1: Vec<String>,

    /// Comma-separated tokens drafted by player two
    #[arg(long, value_delimiter = ',')]
    picks2: Vec<String>,

    /// Print the token catalogue and exit
    #[arg(long)]
    catalog: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> MatchFile {
        MatchFile {
            difficulty: self.difficulty,
            roster_size: self.roster_size,
            seed: self.seed,
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            picks1: self.picks1.clone(),
            picks2: self.picks2.clone(),
        }
    }
}

fn parse_roster_size(value: &str) -> Result<RosterSize> {
    let requested: u8 = value
        .parse()
        .with_context(|| format!("'{value}' is not a roster size"))?;
    Ok(RosterSize::new(requested)?)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "maze_runners=debug"
    } else {
        "maze_runners=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_catalog(out: &mut impl Write) -> Result<()> {
    writeln!(out, "{:<11} {:>5}  Ability", "Token", "Speed")?;
    for entry in &CATALOG {
        writeln!(out, "{:<11} {:>5}  {}", entry.name(), entry.speed(), entry.ability())?;
    }
    Ok(())
}

/// Entry point for the Maze Runners command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.catalog {
        return print_catalog(&mut io::stdout().lock());
    }

    let file = match &cli.config {
        Some(path) => MatchFile::load(path)?,
        None => MatchFile::default(),
    };
    let config = file.merged(cli.overrides()).into_config()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, "replay this match with --seed {seed}");

    let mut world = Bootstrap
        .prepare(&config, seed)
        .context("invalid match configuration")?;

    let stdin = io::stdin();
    let input = StdinInput::new(stdin.lock(), io::stdout());
    let mut engine = TurnEngine::new(input, TextRenderer::new(io::stdout()), LoggingAudio::default());
    let mut log = Vec::new();
    let report = engine.run(&mut world, &mut log);

    let (_, renderer, _) = engine.into_parts();
    let mut out = renderer.finish()?;
    match report.winner() {
        Some(winner) => writeln!(
            out,
            "{} wins after {} turns!",
            config.player_names[winner.index()],
            report.turns
        )?,
        None => writeln!(out, "Match abandoned after {} turns.", report.turns)?,
    }
    Ok(())
}
