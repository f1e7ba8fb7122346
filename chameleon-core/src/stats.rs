//! Cumulative per-player statistics across rounds

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::player::PlayerId;
use crate::round::Round;
use crate::sanitize::words_match;
use crate::tally::is_strict_majority;

/// Counters for one player. Only ever incremented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Rounds played as the impostor
    pub times_as_impostor: u32,
    /// Rounds as impostor where a strict majority voted for them
    pub times_identified: u32,
    /// Rounds as impostor where the final guess named the secret word
    pub correct_guesses: u32,
    /// Initial votes cast for the actual impostor
    pub correct_votes: u32,
    /// Rounds as an honest player where a strict majority voted for them
    pub times_falsely_accused: u32,
}

impl PlayerStats {
    /// Fraction of impostor rounds in which the player was identified
    pub fn identification_rate(&self) -> f32 {
        ratio(self.times_identified, self.times_as_impostor)
    }

    /// Fraction of impostor rounds with a correct guess
    pub fn guess_rate(&self) -> f32 {
        ratio(self.correct_guesses, self.times_as_impostor)
    }

    /// Fraction of votes cast while honest that named the impostor
    pub fn vote_accuracy(&self, rounds_played: u32) -> f32 {
        ratio(
            self.correct_votes,
            rounds_played.saturating_sub(self.times_as_impostor),
        )
    }
}

fn ratio(num: u32, den: u32) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Stats for the whole roster, indexed by player id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    players: Vec<PlayerStats>,
    rounds_recorded: u32,
}

impl StatsTable {
    pub fn new(roster_size: usize) -> Self {
        Self {
            players: vec![PlayerStats::default(); roster_size],
            rounds_recorded: 0,
        }
    }

    /// Fold one completed round into the counters.
    ///
    /// Counts come from the initial vote. The round is checked before any
    /// counter moves, so a rejected round leaves the table untouched.
    pub fn record(&mut self, round: &Round) -> Result<()> {
        let roster_size = self.players.len();
        let in_range = |id: PlayerId| id.index() < roster_size;

        if !in_range(round.impostor) {
            return Err(CoreError::UnknownPlayer(round.impostor));
        }
        if let Some(bad) = round
            .votes
            .iter()
            .flat_map(|v| [v.voter, v.suspect])
            .find(|&id| !in_range(id))
        {
            return Err(CoreError::UnknownPlayer(bad));
        }

        let tally = round.initial_tally();
        let impostor = round.impostor;

        let stats = &mut self.players[impostor.index()];
        stats.times_as_impostor += 1;
        if is_strict_majority(tally.votes_for(impostor), roster_size) {
            stats.times_identified += 1;
        }
        if words_match(&round.guess, &round.secret_word) {
            stats.correct_guesses += 1;
        }

        for voter in round.votes.voters_for(impostor) {
            self.players[voter.index()].correct_votes += 1;
        }

        for (&suspect, &count) in tally.counts() {
            if suspect != impostor && is_strict_majority(count, roster_size) {
                self.players[suspect.index()].times_falsely_accused += 1;
            }
        }

        self.rounds_recorded += 1;
        Ok(())
    }

    pub fn get(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(player.index())
    }

    /// `(id, stats)` pairs in roster order
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerStats)> {
        self.players
            .iter()
            .enumerate()
            .map(|(i, stats)| (PlayerId(i), stats))
    }

    pub fn rounds_recorded(&self) -> u32 {
        self.rounds_recorded
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
