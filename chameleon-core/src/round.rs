//! Round engine - one full round of Chameleon
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: RoundEngine::play (orchestration)
//! - Level 2: hint_phase, vote_phase, tie_break_phase, guess_phase (phases)
//! - Level 3: collect_votes, determine_winner (steps)
//! - Level 4: Turn, VoteMap, Round data types

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{CoreError, Result};
use crate::player::{Player, PlayerId, Roster};
use crate::provider::{GuessRequest, HintRequest, ReasoningProvider, TieBreakRequest, VoteRequest};
use crate::sanitize::words_match;
use crate::tally::{tally, VoteTally};

// ============================================================================
// DATA TYPES (Level 4)
// ============================================================================

/// One hint, recorded in play order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player: PlayerId,
    /// Position in the round's play order (0-based)
    pub index: usize,
    pub hint: String,
    pub is_impostor: bool,
}

/// A single ballot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: PlayerId,
    pub suspect: PlayerId,
}

/// Ballots of one voting phase, in the order they were cast
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMap {
    votes: Vec<Vote>,
}

impl VoteMap {
    pub fn from_votes(votes: Vec<Vote>) -> Self {
        Self { votes }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vote> {
        self.votes.iter()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Who `voter` voted for
    pub fn suspect_of(&self, voter: PlayerId) -> Option<PlayerId> {
        self.votes.iter().find(|v| v.voter == voter).map(|v| v.suspect)
    }

    /// Voters who named `suspect`
    pub fn voters_for(&self, suspect: PlayerId) -> impl Iterator<Item = PlayerId> + '_ {
        self.votes
            .iter()
            .filter(move |v| v.suspect == suspect)
            .map(|v| v.voter)
    }

    /// Check that every registered player voted exactly once, for a
    /// registered player
    pub fn validate(&self, roster: &Roster) -> Result<()> {
        let mut seen = vec![false; roster.len()];

        for vote in &self.votes {
            if !roster.contains(vote.voter) {
                return Err(CoreError::UnknownPlayer(vote.voter));
            }
            if !roster.contains(vote.suspect) {
                return Err(CoreError::UnknownPlayer(vote.suspect));
            }
            if std::mem::replace(&mut seen[vote.voter.index()], true) {
                return Err(CoreError::DuplicateVote(vote.voter));
            }
        }

        match seen.iter().position(|&voted| !voted) {
            Some(missing) => Err(CoreError::MissingVote(PlayerId(missing))),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a VoteMap {
    type Item = &'a Vote;
    type IntoIter = std::slice::Iter<'a, Vote>;

    fn into_iter(self) -> Self::IntoIter {
        self.votes.iter()
    }
}

/// Second vote held when the initial vote ties
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreak {
    /// Players tied for the most initial votes, ascending by id
    pub candidates: Vec<PlayerId>,
    pub votes: VoteMap,
}

/// Everything the scheduler decides before a round starts
#[derive(Clone, Debug)]
pub struct RoundSetup<'a> {
    pub category: &'a Category,
    pub secret_word: String,
    pub impostor: PlayerId,
    /// A permutation of the whole roster
    pub play_order: Vec<PlayerId>,
}

/// A completed round. Immutable once returned by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub category: String,
    pub secret_word: String,
    pub impostor: PlayerId,
    pub turns: Vec<Turn>,
    pub votes: VoteMap,
    pub tie_break: Option<TieBreak>,
    pub final_suspect: PlayerId,
    pub guess: String,
    /// The impostor, or `None` when the honest players won
    pub winner: Option<PlayerId>,
}

impl Round {
    /// The final suspect is the impostor
    pub fn caught(&self) -> bool {
        self.final_suspect == self.impostor
    }

    pub fn guessed_correctly(&self) -> bool {
        words_match(&self.guess, &self.secret_word)
    }

    pub fn impostor_won(&self) -> bool {
        self.winner == Some(self.impostor)
    }

    /// Tally of the initial vote
    pub fn initial_tally(&self) -> VoteTally {
        tally(&self.votes)
    }

    pub fn play_order(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.turns.iter().map(|t| t.player)
    }
}

/// Round engine settings
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Ask voters concurrently (ballots are still recorded in play order)
    pub parallel_votes: bool,
}

impl EngineConfig {
    pub fn with_parallel_votes(mut self, parallel: bool) -> Self {
        self.parallel_votes = parallel;
        self
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Runs rounds against a roster and a reasoning provider
pub struct RoundEngine<'a> {
    roster: &'a Roster,
    provider: &'a dyn ReasoningProvider,
    config: EngineConfig,
}

impl<'a> RoundEngine<'a> {
    pub fn new(roster: &'a Roster, provider: &'a dyn ReasoningProvider) -> Self {
        Self {
            roster,
            provider,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Play one round end-to-end.
    ///
    /// Fails only on a contract breach: a bad setup, or a provider naming a
    /// player outside the roster (or outside the tied set in a tie-break).
    pub fn play(&self, setup: &RoundSetup<'_>) -> Result<Round> {
        let order = self.validate_setup(setup)?;
        let category = setup.category;
        let secret = setup.secret_word.as_str();

        tracing::debug!(
            "Round start: category={}, impostor={}",
            category.name,
            self.roster.name(setup.impostor)
        );

        let turns = self.hint_phase(&order, category, secret, setup.impostor);
        let votes = self.vote_phase(&order, category, &turns, secret, setup.impostor)?;
        let initial = tally(&votes);

        let (final_suspect, tie_break) = if initial.is_tie() {
            let tie_break =
                self.tie_break_phase(&order, category, &turns, secret, setup.impostor, &initial)?;
            let suspect = tally(&tie_break.votes)
                .leader()
                .ok_or(CoreError::EmptyRoster)?;
            (suspect, Some(tie_break))
        } else {
            (initial.leader().ok_or(CoreError::EmptyRoster)?, None)
        };

        let guess = self.guess_phase(setup.impostor, category, &turns)?;
        let winner = determine_winner(setup.impostor, final_suspect, &guess, secret);

        tracing::info!(
            "Round done: suspect={}, impostor={}, guess={:?}, winner={}",
            self.roster.name(final_suspect),
            self.roster.name(setup.impostor),
            guess,
            winner.map_or_else(|| "none".to_string(), |w| self.roster.name(w))
        );

        Ok(Round {
            category: category.name.clone(),
            secret_word: setup.secret_word.clone(),
            impostor: setup.impostor,
            turns,
            votes,
            tie_break,
            final_suspect,
            guess,
            winner,
        })
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Sequential fold: each request sees every earlier hint
    fn hint_phase(
        &self,
        order: &[&Player],
        category: &Category,
        secret: &str,
        impostor: PlayerId,
    ) -> Vec<Turn> {
        order
            .iter()
            .enumerate()
            .fold(Vec::with_capacity(order.len()), |mut turns, (index, &player)| {
                let is_impostor = player.id == impostor;
                let hint = self.provider.hint(&HintRequest {
                    player,
                    roster: self.roster,
                    category,
                    secret_word: (!is_impostor).then_some(secret),
                    prior_hints: &turns,
                });
                tracing::debug!("{} hints: {}", player.name, hint);

                turns.push(Turn {
                    player: player.id,
                    index,
                    hint,
                    is_impostor,
                });
                turns
            })
    }

    fn vote_phase(
        &self,
        order: &[&Player],
        category: &Category,
        turns: &[Turn],
        secret: &str,
        impostor: PlayerId,
    ) -> Result<VoteMap> {
        let votes = self.collect_votes(order, |player| {
            self.provider.vote(&VoteRequest {
                player,
                roster: self.roster,
                category,
                hints: turns,
                secret_word: (player.id != impostor).then_some(secret),
            })
        });
        votes.validate(self.roster)?;
        Ok(votes)
    }

    fn tie_break_phase(
        &self,
        order: &[&Player],
        category: &Category,
        turns: &[Turn],
        secret: &str,
        impostor: PlayerId,
        initial: &VoteTally,
    ) -> Result<TieBreak> {
        let candidates = initial.leaders().to_vec();
        tracing::info!(
            "Tie between {}, holding tie-break vote",
            candidates
                .iter()
                .map(|&id| self.roster.name(id))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let votes = self.collect_votes(order, |player| {
            self.provider.tie_break_vote(&TieBreakRequest {
                player,
                roster: self.roster,
                category,
                hints: turns,
                secret_word: secret,
                candidates: &candidates,
                is_impostor: player.id == impostor,
            })
        });
        votes.validate(self.roster)?;

        if let Some(stray) = votes.iter().find(|v| !candidates.contains(&v.suspect)) {
            return Err(CoreError::TieBreakOutOfRange {
                voter: stray.voter,
                suspect: stray.suspect,
            });
        }

        Ok(TieBreak { candidates, votes })
    }

    /// Always asked, caught or not
    fn guess_phase(&self, impostor: PlayerId, category: &Category, turns: &[Turn]) -> Result<String> {
        let player = self
            .roster
            .get(impostor)
            .ok_or(CoreError::UnknownPlayer(impostor))?;
        Ok(self.provider.guess(&GuessRequest {
            player,
            roster: self.roster,
            category,
            hints: turns,
        }))
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    /// Ask every player in `order` for a ballot. Concurrent when configured;
    /// ballots always come back in play order.
    fn collect_votes<F>(&self, order: &[&Player], ask: F) -> VoteMap
    where
        F: Fn(&Player) -> PlayerId + Sync,
    {
        let cast = |player: &&Player| Vote {
            voter: player.id,
            suspect: ask(*player),
        };

        let votes: Vec<Vote> = if self.config.parallel_votes {
            order.par_iter().map(cast).collect()
        } else {
            order.iter().map(cast).collect()
        };
        VoteMap::from_votes(votes)
    }

    /// Resolve the play order to players, rejecting anything that is not a
    /// permutation of the roster
    fn validate_setup(&self, setup: &RoundSetup<'_>) -> Result<Vec<&'a Player>> {
        if !self.roster.contains(setup.impostor) {
            return Err(CoreError::UnknownPlayer(setup.impostor));
        }
        if !setup.category.contains_word(&setup.secret_word) {
            return Err(CoreError::UnknownWord {
                category: setup.category.name.clone(),
                word: setup.secret_word.clone(),
            });
        }
        if setup.play_order.len() != self.roster.len() {
            return Err(CoreError::InvalidPlayOrder(format!(
                "expected {} players, got {}",
                self.roster.len(),
                setup.play_order.len()
            )));
        }

        let mut seen = vec![false; self.roster.len()];
        setup
            .play_order
            .iter()
            .map(|&id| {
                let player = self.roster.get(id).ok_or(CoreError::UnknownPlayer(id))?;
                if std::mem::replace(&mut seen[id.index()], true) {
                    return Err(CoreError::InvalidPlayOrder(format!("{} appears twice", player.name)));
                }
                Ok(player)
            })
            .collect()
    }
}

/// Winner rule: an uncaught impostor wins; a caught impostor wins only by
/// naming the secret word.
pub fn determine_winner(
    impostor: PlayerId,
    final_suspect: PlayerId,
    guess: &str,
    secret_word: &str,
) -> Option<PlayerId> {
    let caught = final_suspect == impostor;
    if !caught || words_match(guess, secret_word) {
        Some(impostor)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);
    const D: PlayerId = PlayerId(3);
    const E: PlayerId = PlayerId(4);

    /// Provider answering from fixed per-player tables and recording what it
    /// was shown
    struct Scripted {
        votes: Vec<PlayerId>,
        tie_votes: Vec<PlayerId>,
        guess: &'static str,
        seen_words: Mutex<Vec<(PlayerId, Option<String>)>>,
        prior_hint_counts: Mutex<Vec<usize>>,
        tie_break_calls: Mutex<usize>,
    }

    impl Scripted {
        fn new(votes: [PlayerId; 5], tie_votes: [PlayerId; 5], guess: &'static str) -> Self {
            Self {
                votes: votes.to_vec(),
                tie_votes: tie_votes.to_vec(),
                guess,
                seen_words: Mutex::new(Vec::new()),
                prior_hint_counts: Mutex::new(Vec::new()),
                tie_break_calls: Mutex::new(0),
            }
        }
    }

    impl ReasoningProvider for Scripted {
        fn hint(&self, request: &HintRequest<'_>) -> String {
            self.seen_words
                .lock()
                .unwrap()
                .push((request.player.id, request.secret_word.map(str::to_string)));
            self.prior_hint_counts
                .lock()
                .unwrap()
                .push(request.prior_hints.len());
            format!("hint-{}", request.player.name)
        }

        fn vote(&self, request: &VoteRequest<'_>) -> PlayerId {
            self.votes[request.player.id.index()]
        }

        fn tie_break_vote(&self, request: &TieBreakRequest<'_>) -> PlayerId {
            *self.tie_break_calls.lock().unwrap() += 1;
            self.tie_votes[request.player.id.index()]
        }

        fn guess(&self, _: &GuessRequest<'_>) -> String {
            self.guess.to_string()
        }
    }

    fn animals() -> Category {
        Category::new("Animals", ["Lion", "Tiger", "Fox", "Wolf"])
    }

    fn setup(category: &Category, impostor: PlayerId, order: Vec<PlayerId>) -> RoundSetup<'_> {
        RoundSetup {
            category,
            secret_word: "Fox".to_string(),
            impostor,
            play_order: order,
        }
    }

    fn canonical() -> Vec<PlayerId> {
        vec![A, B, C, D, E]
    }

    #[test]
    fn test_turn_indices_follow_play_order() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Fox");
        let engine = RoundEngine::new(&roster, &provider);

        let order = vec![D, B, E, A, C];
        let round = engine.play(&setup(&category, C, order.clone())).unwrap();

        let indices: Vec<_> = round.turns.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(round.play_order().collect::<Vec<_>>(), order);
        assert_eq!(round.turns[4].hint, "hint-Charlie");
        assert!(round.turns[4].is_impostor);
        assert_eq!(round.turns.iter().filter(|t| t.is_impostor).count(), 1);
    }

    #[test]
    fn test_hints_are_progressive() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Fox");
        let engine = RoundEngine::new(&roster, &provider);

        engine.play(&setup(&category, C, canonical())).unwrap();
        assert_eq!(*provider.prior_hint_counts.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_secret_word_withheld_from_impostor() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Fox");
        let engine = RoundEngine::new(&roster, &provider);

        engine.play(&setup(&category, C, canonical())).unwrap();
        for (player, word) in provider.seen_words.lock().unwrap().iter() {
            if *player == C {
                assert_eq!(*word, None);
            } else {
                assert_eq!(word.as_deref(), Some("Fox"));
            }
        }
    }

    #[test]
    fn test_caught_impostor_guessing_right_wins() {
        let roster = Roster::standard();
        let category = animals();
        // {A->C, B->C, C->D, D->C, E->A}: C has 3
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "  fox ");
        let engine = RoundEngine::new(&roster, &provider);

        let round = engine.play(&setup(&category, C, canonical())).unwrap();
        assert_eq!(round.final_suspect, C);
        assert!(round.caught());
        assert!(round.tie_break.is_none());
        assert_eq!(*provider.tie_break_calls.lock().unwrap(), 0);
        assert!(round.guessed_correctly());
        assert_eq!(round.winner, Some(C));
    }

    #[test]
    fn test_caught_impostor_guessing_wrong_loses() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Wolf");
        let engine = RoundEngine::new(&roster, &provider);

        let round = engine.play(&setup(&category, C, canonical())).unwrap();
        assert!(round.caught());
        assert_eq!(round.guess, "Wolf");
        assert_eq!(round.winner, None);
    }

    #[test]
    fn test_uncaught_impostor_wins_regardless_of_guess() {
        let roster = Roster::standard();
        let category = animals();
        // D collects 3 votes but E is the impostor
        let provider = Scripted::new([D, D, D, A, A], [A; 5], "Wolf");
        let engine = RoundEngine::new(&roster, &provider);

        let round = engine.play(&setup(&category, E, canonical())).unwrap();
        assert_eq!(round.final_suspect, D);
        assert!(!round.caught());
        assert_eq!(round.winner, Some(E));
        assert!(round.impostor_won());
    }

    #[test]
    fn test_tie_break_among_tied_only() {
        let roster = Roster::standard();
        let category = animals();
        // {A->B, B->A, C->B, D->A, E->C}: A and B tie on 2
        let provider = Scripted::new([B, A, B, A, C], [B, A, B, B, B], "Wolf");
        let engine = RoundEngine::new(&roster, &provider);

        let round = engine.play(&setup(&category, B, canonical())).unwrap();
        let tie_break = round.tie_break.as_ref().expect("tie-break expected");
        assert_eq!(tie_break.candidates, vec![A, B]);
        assert_eq!(tie_break.votes.len(), 5);
        assert_eq!(*provider.tie_break_calls.lock().unwrap(), 5);
        assert_eq!(round.final_suspect, B);
        assert!(round.caught());
        assert_eq!(round.winner, None);
    }

    #[test]
    fn test_tie_break_sub_tie_goes_to_lowest_id() {
        // Documented policy choice: a tie inside the tie-break goes to the
        // candidate earliest in roster order
        let roster = Roster::new([("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]).unwrap();
        let category = animals();

        struct Split;
        impl ReasoningProvider for Split {
            fn hint(&self, _: &HintRequest<'_>) -> String {
                "x".into()
            }
            fn vote(&self, r: &VoteRequest<'_>) -> PlayerId {
                // A->C, B->D, C->C, D->D: C and D tie
                [C, D, C, D][r.player.id.index()]
            }
            fn tie_break_vote(&self, r: &TieBreakRequest<'_>) -> PlayerId {
                // Still 2-2
                [D, C, C, D][r.player.id.index()]
            }
            fn guess(&self, _: &GuessRequest<'_>) -> String {
                "Lion".into()
            }
        }

        let engine = RoundEngine::new(&roster, &Split);
        let round = engine.play(&setup(&category, D, vec![D, C, B, A])).unwrap();
        assert!(round.tie_break.is_some());
        assert_eq!(round.final_suspect, C);
        assert_eq!(round.winner, Some(D));
    }

    #[test]
    fn test_tie_break_vote_outside_candidates_fails() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([B, A, B, A, C], [B, A, E, B, B], "Wolf");
        let engine = RoundEngine::new(&roster, &provider);

        let result = engine.play(&setup(&category, B, canonical()));
        assert!(matches!(
            result,
            Err(CoreError::TieBreakOutOfRange { voter, suspect }) if voter == C && suspect == E
        ));
    }

    #[test]
    fn test_vote_for_unknown_player_fails() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([B, A, PlayerId(7), A, C], [A; 5], "Wolf");
        let engine = RoundEngine::new(&roster, &provider);

        let result = engine.play(&setup(&category, B, canonical()));
        assert!(matches!(result, Err(CoreError::UnknownPlayer(PlayerId(7)))));
    }

    #[test]
    fn test_invalid_play_order_rejected() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Fox");
        let engine = RoundEngine::new(&roster, &provider);

        let result = engine.play(&setup(&category, C, vec![A, B, C, D]));
        assert!(matches!(result, Err(CoreError::InvalidPlayOrder(_))));

        let result = engine.play(&setup(&category, C, vec![A, B, C, D, D]));
        assert!(matches!(result, Err(CoreError::InvalidPlayOrder(_))));

        let result = engine.play(&setup(&category, PlayerId(9), canonical()));
        assert!(matches!(result, Err(CoreError::UnknownPlayer(_))));
    }

    #[test]
    fn test_unknown_secret_word_rejected() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([C, C, D, C, A], [A; 5], "Fox");
        let engine = RoundEngine::new(&roster, &provider);

        let mut bad = setup(&category, C, canonical());
        bad.secret_word = "Unicorn".to_string();
        assert!(matches!(engine.play(&bad), Err(CoreError::UnknownWord { .. })));
    }

    #[test]
    fn test_parallel_votes_keep_play_order() {
        let roster = Roster::standard();
        let category = animals();
        let provider = Scripted::new([B, A, B, A, C], [B, A, B, B, B], "Wolf");
        let engine = RoundEngine::new(&roster, &provider)
            .with_config(EngineConfig::default().with_parallel_votes(true));

        let order = vec![E, D, C, B, A];
        let round = engine.play(&setup(&category, B, order.clone())).unwrap();
        let voters: Vec<_> = round.votes.iter().map(|v| v.voter).collect();
        assert_eq!(voters, order);
        assert_eq!(round.final_suspect, B);
    }

    #[test]
    fn test_vote_map_validate() {
        let roster = Roster::new([("a", "A"), ("b", "B")]).unwrap();

        let ok = VoteMap::from_votes(vec![Vote { voter: A, suspect: B }, Vote { voter: B, suspect: B }]);
        assert!(ok.validate(&roster).is_ok());
        assert_eq!(ok.suspect_of(A), Some(B));
        assert_eq!(ok.voters_for(B).collect::<Vec<_>>(), vec![A, B]);

        let missing = VoteMap::from_votes(vec![Vote { voter: A, suspect: B }]);
        assert!(matches!(missing.validate(&roster), Err(CoreError::MissingVote(B))));

        let twice = VoteMap::from_votes(vec![Vote { voter: A, suspect: B }, Vote { voter: A, suspect: A }]);
        assert!(matches!(twice.validate(&roster), Err(CoreError::DuplicateVote(A))));
    }

    #[test]
    fn test_determine_winner() {
        assert_eq!(determine_winner(C, C, "Fox", "fox"), Some(C));
        assert_eq!(determine_winner(C, C, "Wolf", "Fox"), None);
        assert_eq!(determine_winner(C, D, "Wolf", "Fox"), Some(C));
        assert_eq!(determine_winner(C, D, "Fox", "Fox"), Some(C));
    }
}
