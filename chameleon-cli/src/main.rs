//! Chameleon CLI - Command-line interface
//!
//! Commands:
//! - play: Run a tournament between the roster's agents
//! - categories: List the category dataset
//! - roster: Show the players and their providers

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chameleon_cli::list_cmd::{self, CategoriesArgs, RosterArgs};
use chameleon_cli::play_cmd::{self, PlayArgs};

#[derive(Parser)]
#[command(name = "chameleon")]
#[command(about = "Chameleon social-deduction arena for reasoning agents")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tournament
    Play(PlayArgs),
    /// List the categories of the dataset
    Categories(CategoriesArgs),
    /// Show the roster
    Roster(RosterArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Categories(args) => list_cmd::run_categories(args),
        Commands::Roster(args) => list_cmd::run_roster(args),
    }
}
