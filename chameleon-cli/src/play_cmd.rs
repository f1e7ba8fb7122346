//! Play command - run a Chameleon tournament
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_inputs(), play(), report_results()
//! - Level 3: build_provider(), create_output_directory()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use chameleon_core::{CategorySet, Roster};
use chameleon_tournament::{run_tournament, TournamentConfig, TournamentResult};

use crate::chat_provider::ChatConfig;
use crate::json_sink::JsonFileSink;
use crate::roster_config::RosterConfig;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone, Debug)]
pub struct PlayArgs {
    /// Rounds played for each category
    #[arg(long, default_value = "4")]
    pub rounds_per_category: usize,

    /// Category dataset JSON file (built-in dataset if omitted)
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,

    /// Only play this category (repeatable, played in the given order)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// Roster JSON file (standard random roster if omitted)
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Output directory for the round log and statistics
    #[arg(long, default_value = "results")]
    pub output: PathBuf,

    /// Ask voters concurrently
    #[arg(long)]
    pub parallel_votes: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything a finished run produced
pub struct PlayOutcome {
    pub roster: Roster,
    pub result: TournamentResult,
    pub log_path: PathBuf,
    pub stats_path: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Play the tournament, writing result files as it goes
/// 2. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let outcome = play(&args, seed)?;
    report_results(&outcome, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load inputs, play every round, and persist results
pub fn play(args: &PlayArgs, seed: Option<u64>) -> Result<PlayOutcome> {
    let (roster_config, categories) = load_inputs(args)?;
    let roster = roster_config.roster().context("Invalid roster")?;

    let provider = roster_config.build_provider(&roster, seed, &ChatConfig::from_env())?;

    create_output_directory(&args.output)?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let mut sink = JsonFileSink::new(&args.output, &stamp);

    let config = tournament_config(args, seed);
    tracing::info!(
        "Starting tournament: {} players, {} rounds per category",
        roster.len(),
        config.rounds_per_category
    );

    let result = run_tournament(&roster, &categories, &config, &provider, &mut sink)
        .context("Tournament could not start")?;

    if result.sink_failures > 0 {
        tracing::warn!("{} result writes failed", result.sink_failures);
    } else {
        tracing::info!("Saved round log to {}", sink.log_path().display());
    }

    Ok(PlayOutcome {
        roster,
        result,
        log_path: sink.log_path().to_path_buf(),
        stats_path: sink.stats_path().to_path_buf(),
    })
}

/// Load the roster file and category dataset
fn load_inputs(args: &PlayArgs) -> Result<(RosterConfig, CategorySet)> {
    let roster = RosterConfig::load_or_default(args.roster.as_deref())?;
    let categories = load_categories(args.categories.as_deref())?;
    Ok((roster, categories))
}

/// Report results
fn report_results(outcome: &PlayOutcome, args: &PlayArgs) {
    if args.json {
        print_json_results(outcome);
    } else {
        print_text_results(outcome);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Dataset from `path`, or the built-in one
pub fn load_categories(path: Option<&Path>) -> Result<CategorySet> {
    match path {
        Some(p) => CategorySet::load(p)
            .with_context(|| format!("Failed to load categories: {}", p.display())),
        None => CategorySet::builtin().context("Built-in category dataset is invalid"),
    }
}

fn tournament_config(args: &PlayArgs, seed: Option<u64>) -> TournamentConfig {
    let mut config =
        TournamentConfig::new(args.rounds_per_category).with_parallel_votes(args.parallel_votes);
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if !args.only.is_empty() {
        config = config.with_categories(args.only.iter().cloned());
    }
    config
}

fn create_output_directory(output: &Path) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(outcome: &PlayOutcome) {
    #[derive(serde::Serialize)]
    struct JsonPlayer {
        name: String,
        key: String,
        times_as_impostor: u32,
        times_identified: u32,
        correct_guesses: u32,
        correct_votes: u32,
        times_falsely_accused: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        rounds_played: usize,
        rounds_failed: usize,
        impostor_wins: usize,
        impostors_caught: usize,
        tie_breaks: usize,
        impostor_win_rate: f32,
        log_file: String,
        stats_file: String,
        players: Vec<JsonPlayer>,
    }

    let result = &outcome.result;
    let output = JsonOutput {
        rounds_played: result.rounds.len(),
        rounds_failed: result.failures.len(),
        impostor_wins: result.impostor_wins(),
        impostors_caught: result.impostors_caught(),
        tie_breaks: result.tie_breaks(),
        impostor_win_rate: result.impostor_win_rate(),
        log_file: outcome.log_path.display().to_string(),
        stats_file: outcome.stats_path.display().to_string(),
        players: outcome
            .roster
            .players()
            .iter()
            .filter_map(|p| {
                result.stats.get(p.id).map(|s| JsonPlayer {
                    name: p.name.clone(),
                    key: p.key.clone(),
                    times_as_impostor: s.times_as_impostor,
                    times_identified: s.times_identified,
                    correct_guesses: s.correct_guesses,
                    correct_votes: s.correct_votes,
                    times_falsely_accused: s.times_falsely_accused,
                })
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(outcome: &PlayOutcome) {
    let result = &outcome.result;
    let played = result.rounds.len();

    println!("\n=== Tournament Results ===");
    println!("Rounds played:    {}", played);
    if !result.failures.is_empty() {
        println!("Rounds failed:    {}", result.failures.len());
    }
    println!(
        "Impostor wins:    {} ({:.1}%)",
        result.impostor_wins(),
        result.impostor_win_rate() * 100.0
    );
    println!("Impostors caught: {}", result.impostors_caught());
    println!("Tie-breaks:       {}", result.tie_breaks());

    println!(
        "\n{:<10} {:>9} {:>11} {:>8} {:>6} {:>8}",
        "Player", "Impostor", "Identified", "Guessed", "Votes", "Accused"
    );
    for player in outcome.roster.players() {
        if let Some(s) = result.stats.get(player.id) {
            println!(
                "{:<10} {:>9} {:>11} {:>8} {:>6} {:>8}",
                player.name,
                s.times_as_impostor,
                s.times_identified,
                s.correct_guesses,
                s.correct_votes,
                s.times_falsely_accused
            );
        }
    }

    println!("\nRound log:  {}", outcome.log_path.display());
    println!("Statistics: {}", outcome.stats_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PlayArgs {
        PlayArgs {
            rounds_per_category: 2,
            categories: None,
            only: vec![],
            roster: None,
            output: PathBuf::from("results"),
            parallel_votes: false,
            json: false,
        }
    }

    #[test]
    fn test_tournament_config_from_args() {
        let mut a = args();
        a.only = vec!["Fruits".to_string(), "Movies".to_string()];
        a.parallel_votes = true;

        let config = tournament_config(&a, Some(3));
        assert_eq!(config.rounds_per_category, 2);
        assert_eq!(config.seed, Some(3));
        assert_eq!(
            config.categories,
            Some(vec!["Fruits".to_string(), "Movies".to_string()])
        );
        assert!(config.engine.parallel_votes);
    }

    #[test]
    fn test_no_filter_means_all_categories() {
        let config = tournament_config(&args(), None);
        assert!(config.categories.is_none());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builtin_categories_load() {
        let set = load_categories(None).unwrap();
        assert_eq!(set.len(), 13);
    }
}
