//! Tournament execution - categories, rounds, and bookkeeping

use chameleon_core::{
    Category, CategorySet, CoreError, PlayerId, ReasoningProvider, Roster, Round, RoundEngine,
    RoundSetup, StatsTable,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::TournamentConfig;
use crate::record::{stats_snapshot, RoundRecord};
use crate::sink::ResultSink;

/// A round that was abandoned because a collaborator broke its contract
#[derive(Clone, Debug)]
pub struct RoundFailure {
    /// 1-based position in the tournament
    pub round_number: usize,
    pub category: String,
    pub error: String,
}

/// Result of a tournament
#[derive(Clone, Debug)]
pub struct TournamentResult {
    /// Completed rounds in play order
    pub rounds: Vec<Round>,
    /// Final cumulative statistics
    pub stats: StatsTable,
    /// Rounds that contributed nothing because they failed
    pub failures: Vec<RoundFailure>,
    /// Sink writes that failed (results in memory are unaffected)
    pub sink_failures: usize,
}

impl TournamentResult {
    pub fn rounds_attempted(&self) -> usize {
        self.rounds.len() + self.failures.len()
    }

    pub fn impostor_wins(&self) -> usize {
        self.rounds.iter().filter(|r| r.impostor_won()).count()
    }

    pub fn impostors_caught(&self) -> usize {
        self.rounds.iter().filter(|r| r.caught()).count()
    }

    pub fn tie_breaks(&self) -> usize {
        self.rounds.iter().filter(|r| r.tie_break.is_some()).count()
    }

    /// Fraction of completed rounds won by the impostor
    pub fn impostor_win_rate(&self) -> f32 {
        if self.rounds.is_empty() {
            0.0
        } else {
            self.impostor_wins() as f32 / self.rounds.len() as f32
        }
    }
}

/// Mutable state owned by the single orchestrating flow
struct TournamentState {
    rng: ChaCha8Rng,
    /// Rounds attempted so far, failed ones included
    round_counter: usize,
    rounds: Vec<Round>,
    stats: StatsTable,
    failures: Vec<RoundFailure>,
    sink_failures: usize,
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a tournament (Level 1 orchestration)
///
/// # Arguments
/// * `roster` - Players taking part
/// * `categories` - Category dataset
/// * `config` - Tournament configuration
/// * `provider` - Source of every hint, vote, and guess
/// * `sink` - Receives a record after each round and stats at the end
///
/// # Returns
/// Tournament results, or an error if the configuration names an unknown
/// category. Failed rounds and sink errors do not abort the run.
pub fn run_tournament(
    roster: &Roster,
    categories: &CategorySet,
    config: &TournamentConfig,
    provider: &dyn ReasoningProvider,
    sink: &mut dyn ResultSink,
) -> Result<TournamentResult, CoreError> {
    let categories = match &config.categories {
        Some(names) => categories.select(names.as_slice())?,
        None => categories.clone(),
    };

    let engine = RoundEngine::new(roster, provider).with_config(config.engine.clone());
    let mut state = TournamentState {
        rng: create_rng(config.seed),
        round_counter: 0,
        rounds: Vec::new(),
        stats: StatsTable::new(roster.len()),
        failures: Vec::new(),
        sink_failures: 0,
    };

    tracing::info!(
        "Starting tournament: {} categories x {} rounds, {} players",
        categories.len(),
        config.rounds_per_category,
        roster.len()
    );

    for category in &categories {
        play_category(&engine, roster, category, config.rounds_per_category, &mut state, sink);
    }

    if let Err(e) = sink.record_stats(&stats_snapshot(&state.stats, roster)) {
        tracing::warn!("Failed to save final statistics: {}", e);
        state.sink_failures += 1;
    }

    tracing::info!(
        "Tournament complete: {} rounds played, {} failed",
        state.rounds.len(),
        state.failures.len()
    );

    Ok(TournamentResult {
        rounds: state.rounds,
        stats: state.stats,
        failures: state.failures,
        sink_failures: state.sink_failures,
    })
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Play every round of one category
fn play_category(
    engine: &RoundEngine<'_>,
    roster: &Roster,
    category: &Category,
    rounds: usize,
    state: &mut TournamentState,
    sink: &mut dyn ResultSink,
) {
    tracing::info!("Playing category: {}", category.name);

    for _ in 0..rounds {
        play_scheduled_round(engine, roster, category, state, sink);
    }
}

/// Set up, play, and book-keep a single round
fn play_scheduled_round(
    engine: &RoundEngine<'_>,
    roster: &Roster,
    category: &Category,
    state: &mut TournamentState,
    sink: &mut dyn ResultSink,
) {
    let setup = choose_round(roster, category, state.round_counter, &mut state.rng);
    state.round_counter += 1;
    let round_number = state.round_counter;

    tracing::info!(
        "Round {}: {} / {} (impostor: {})",
        round_number,
        category.name,
        setup.secret_word,
        roster.name(setup.impostor)
    );

    let round = match engine.play(&setup).and_then(|round| {
        state.stats.record(&round)?;
        Ok(round)
    }) {
        Ok(round) => round,
        Err(e) => {
            tracing::warn!("Round {} abandoned: {}", round_number, e);
            state.failures.push(RoundFailure {
                round_number,
                category: category.name.clone(),
                error: e.to_string(),
            });
            return;
        }
    };

    let record = RoundRecord::from_round(&round, round_number, roster, Utc::now());
    if let Err(e) = sink.record_round(&record) {
        tracing::warn!("Failed to save round {}: {}", round_number, e);
        state.sink_failures += 1;
    }

    state.rounds.push(round);
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Draw the secret word, impostor, and play order for the next round
fn choose_round<'c, R: Rng + ?Sized>(
    roster: &Roster,
    category: &'c Category,
    round_counter: usize,
    rng: &mut R,
) -> RoundSetup<'c> {
    // CategorySet guarantees at least one word; roster at least one player
    let secret_word = category.words.choose(rng).cloned().unwrap_or_default();
    let impostor = PlayerId(rng.gen_range(0..roster.len()));
    let play_order = play_order(roster, round_counter, rng);

    RoundSetup {
        category,
        secret_word,
        impostor,
        play_order,
    }
}

/// Canonical order rotated left by `round_counter mod N`, then shuffled.
///
/// The rotation spreads first-turn slots across the tournament even if the
/// shuffle is biased.
pub fn play_order<R: Rng + ?Sized>(roster: &Roster, round_counter: usize, rng: &mut R) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> = roster.ids().collect();
    if !order.is_empty() {
        let shift = round_counter % order.len();
        order.rotate_left(shift);
    }
    order.shuffle(rng);
    order
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
