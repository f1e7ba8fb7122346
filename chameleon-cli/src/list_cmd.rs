//! Listing commands - inspect the category dataset and the roster

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::play_cmd::load_categories;
use crate::roster_config::RosterConfig;

#[derive(Args, Clone, Debug)]
pub struct CategoriesArgs {
    /// Category dataset JSON file (built-in dataset if omitted)
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,

    /// Print every word, not just the count
    #[arg(long)]
    pub words: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct RosterArgs {
    /// Roster JSON file (standard random roster if omitted)
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// List the categories of the dataset
pub fn run_categories(args: CategoriesArgs) -> Result<()> {
    let categories = load_categories(args.categories.as_deref())?;

    if args.json {
        let list: Vec<_> = categories.iter().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{} categories:", categories.len());
    for category in &categories {
        if args.words {
            println!("  {:<16} {}", category.name, category.words.join(", "));
        } else {
            println!("  {:<16} {} words", category.name, category.words.len());
        }
    }
    Ok(())
}

/// Print the roster and the provider behind each player
pub fn run_roster(args: RosterArgs) -> Result<()> {
    let config = RosterConfig::load_or_default(args.roster.as_deref())?;
    // Reject duplicates before printing anything
    config.roster().context("Invalid roster")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{:<4} {:<12} {:<28} {}", "#", "Name", "Key", "Provider");
    for (i, entry) in config.entries.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:<28} {:?}",
            i,
            entry.name,
            entry.key,
            entry.provider
        );
    }
    Ok(())
}
