//! Chameleon Core - Round engine for the Chameleon social-deduction game
//!
//! This crate provides the core game logic:
//! - Player roster (immutable registry of agent identities)
//! - Categories and the built-in word dataset
//! - Round engine (hint, vote, tie-break, guess, win determination)
//! - Vote tallying with explicit tie policy
//! - Cumulative per-player statistics
//! - The reasoning-provider capability and its built-in implementations

pub mod error;
pub mod player;
pub mod category;
pub mod provider;
pub mod sanitize;
pub mod tally;
pub mod round;
pub mod stats;

// Re-exports for convenient access
pub use error::CoreError;
pub use player::{Player, PlayerId, Roster};
pub use category::{Category, CategorySet};
pub use provider::{
    fallback_choice, GuessRequest, HintRequest, RandomProvider, ReasoningProvider, RoutedProvider,
    TieBreakRequest, VoteRequest,
};
pub use sanitize::{resolve_guess, resolve_vote, sanitize_hint, words_match};
pub use tally::{is_strict_majority, tally, VoteTally};
pub use round::{
    determine_winner, EngineConfig, Round, RoundEngine, RoundSetup, TieBreak, Turn, Vote, VoteMap,
};
pub use stats::{PlayerStats, StatsTable};
