//! Reasoning providers - where hints, votes, and guesses come from
//!
//! The round engine only depends on [`ReasoningProvider`]. Implementations
//! must always answer: malformed or missing responses are resolved here, at
//! the provider boundary, never inside the engine.

use std::sync::Mutex;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::category::Category;
use crate::player::{Player, PlayerId, Roster};
use crate::round::Turn;
use crate::sanitize::EMPTY_HINT;

/// Context for a hint request
#[derive(Clone, Copy, Debug)]
pub struct HintRequest<'a> {
    pub player: &'a Player,
    pub roster: &'a Roster,
    pub category: &'a Category,
    /// `None` when the requester is the impostor
    pub secret_word: Option<&'a str>,
    /// Hints given so far this round, in play order
    pub prior_hints: &'a [Turn],
}

/// Context for an initial vote
#[derive(Clone, Copy, Debug)]
pub struct VoteRequest<'a> {
    pub player: &'a Player,
    pub roster: &'a Roster,
    pub category: &'a Category,
    pub hints: &'a [Turn],
    /// `None` tells the voter they are the impostor
    pub secret_word: Option<&'a str>,
}

/// Context for a tie-break vote
#[derive(Clone, Copy, Debug)]
pub struct TieBreakRequest<'a> {
    pub player: &'a Player,
    pub roster: &'a Roster,
    pub category: &'a Category,
    pub hints: &'a [Turn],
    pub secret_word: &'a str,
    /// The answer must be one of these
    pub candidates: &'a [PlayerId],
    pub is_impostor: bool,
}

impl<'a> TieBreakRequest<'a> {
    /// The secret word as the voter is allowed to see it
    pub fn visible_word(&self) -> Option<&'a str> {
        if self.is_impostor {
            None
        } else {
            Some(self.secret_word)
        }
    }
}

/// Context for the impostor's final guess
#[derive(Clone, Copy, Debug)]
pub struct GuessRequest<'a> {
    pub player: &'a Player,
    pub roster: &'a Roster,
    pub category: &'a Category,
    pub hints: &'a [Turn],
}

/// Capability supplying every decision an agent makes during a round.
///
/// All four operations are infallible from the engine's point of view.
/// `tie_break_vote` must return one of `request.candidates`.
pub trait ReasoningProvider: Send + Sync {
    fn hint(&self, request: &HintRequest<'_>) -> String;

    fn vote(&self, request: &VoteRequest<'_>) -> PlayerId;

    fn tie_break_vote(&self, request: &TieBreakRequest<'_>) -> PlayerId;

    fn guess(&self, request: &GuessRequest<'_>) -> String;
}

/// Uniform pick among `candidates`, avoiding `requester` when any other
/// candidate exists. `None` only if `candidates` is empty.
pub fn fallback_choice<R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &[PlayerId],
    requester: PlayerId,
) -> Option<PlayerId> {
    let others: Vec<PlayerId> = candidates
        .iter()
        .copied()
        .filter(|&id| id != requester)
        .collect();

    if others.is_empty() {
        candidates.choose(rng).copied()
    } else {
        others.choose(rng).copied()
    }
}

// ============================================================================
// RANDOM PROVIDER
// ============================================================================

/// Agent that answers uniformly at random.
///
/// Useful as an offline baseline and as the fallback when a remote provider
/// cannot be reached. Seeded instances are reproducible as long as calls
/// arrive in the same order (disable parallel votes for that).
pub struct RandomProvider {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *rng)
    }
}

impl Default for RandomProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReasoningProvider for RandomProvider {
    fn hint(&self, request: &HintRequest<'_>) -> String {
        // Never hand out the secret word itself
        let pool: Vec<&String> = request
            .category
            .words
            .iter()
            .filter(|w| request.secret_word != Some(w.as_str()))
            .collect();

        self.with_rng(|rng| pool.choose(rng).map(|w| w.to_string()))
            .unwrap_or_else(|| EMPTY_HINT.to_string())
    }

    fn vote(&self, request: &VoteRequest<'_>) -> PlayerId {
        let all: Vec<PlayerId> = request.roster.ids().collect();
        self.with_rng(|rng| fallback_choice(rng, &all, request.player.id))
            .unwrap_or(request.player.id)
    }

    fn tie_break_vote(&self, request: &TieBreakRequest<'_>) -> PlayerId {
        self.with_rng(|rng| fallback_choice(rng, request.candidates, request.player.id))
            .unwrap_or(request.player.id)
    }

    fn guess(&self, request: &GuessRequest<'_>) -> String {
        self.with_rng(|rng| request.category.words.choose(rng).cloned())
            .unwrap_or_default()
    }
}

// ============================================================================
// ROUTED PROVIDER
// ============================================================================

/// Binds each player to the provider backing them.
///
/// Players without an explicit route are served by the default provider.
pub struct RoutedProvider {
    default: Box<dyn ReasoningProvider>,
    routes: FxHashMap<PlayerId, Box<dyn ReasoningProvider>>,
}

impl RoutedProvider {
    pub fn new(default: Box<dyn ReasoningProvider>) -> Self {
        Self {
            default,
            routes: FxHashMap::default(),
        }
    }

    /// Route one player to a dedicated provider
    pub fn with_route(mut self, player: PlayerId, provider: Box<dyn ReasoningProvider>) -> Self {
        self.routes.insert(player, provider);
        self
    }

    pub fn route(&self, player: PlayerId) -> &dyn ReasoningProvider {
        self.routes
            .get(&player)
            .map(|p| p.as_ref())
            .unwrap_or(self.default.as_ref())
    }
}

impl ReasoningProvider for RoutedProvider {
    fn hint(&self, request: &HintRequest<'_>) -> String {
        self.route(request.player.id).hint(request)
    }

    fn vote(&self, request: &VoteRequest<'_>) -> PlayerId {
        self.route(request.player.id).vote(request)
    }

    fn tie_break_vote(&self, request: &TieBreakRequest<'_>) -> PlayerId {
        self.route(request.player.id).tie_break_vote(request)
    }

    fn guess(&self, request: &GuessRequest<'_>) -> String {
        self.route(request.player.id).guess(request)
    }
}
