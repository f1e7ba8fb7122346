//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use chameleon_core::EngineConfig;

/// Tournament configuration
#[derive(Clone, Debug)]
pub struct TournamentConfig {
    /// Rounds played for each category
    pub rounds_per_category: usize,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Restrict the run to these categories, in this order (None = all)
    pub categories: Option<Vec<String>>,
    /// Round engine settings
    pub engine: EngineConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds_per_category: 4,
            seed: None,
            categories: None,
            engine: EngineConfig::default(),
        }
    }
}

impl TournamentConfig {
    /// Create config with the given number of rounds per category
    pub fn new(rounds_per_category: usize) -> Self {
        Self {
            rounds_per_category,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Only play the named categories
    pub fn with_categories<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Ask voters concurrently
    pub fn with_parallel_votes(mut self, parallel: bool) -> Self {
        self.engine = self.engine.with_parallel_votes(parallel);
        self
    }
}
