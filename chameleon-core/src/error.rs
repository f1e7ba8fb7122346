//! Error types for roster, dataset, and round operations

use crate::player::PlayerId;

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core.
///
/// Round-level variants signal a collaborator contract breach; the round
/// that produced one is discarded by the caller.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Roster is empty")]
    EmptyRoster,

    #[error("Duplicate player in roster: {0}")]
    DuplicatePlayer(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Play order is not a permutation of the roster: {0}")]
    InvalidPlayOrder(String),

    #[error("Missing vote from player {0}")]
    MissingVote(PlayerId),

    #[error("Player {0} voted more than once")]
    DuplicateVote(PlayerId),

    #[error("Player {voter} voted for {suspect}, who is not among the tied candidates")]
    TieBreakOutOfRange { voter: PlayerId, suspect: PlayerId },

    #[error("Category has no words: {0}")]
    EmptyCategory(String),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Secret word {word:?} is not a candidate of category {category}")]
    UnknownWord { category: String, word: String },

    #[error("Dataset parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
