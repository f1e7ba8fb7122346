//! Vote counting
//!
//! Pure functions over a [`VoteMap`]; no side effects, same input gives
//! the same tally.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::player::PlayerId;
use crate::round::VoteMap;

/// Per-candidate vote counts with the plurality leaders
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    /// Candidates that received at least one vote
    counts: BTreeMap<PlayerId, u32>,
    /// Candidates sharing the maximum count, ascending by id
    leaders: Vec<PlayerId>,
    max_votes: u32,
}

impl VoteTally {
    pub fn votes_for(&self, player: PlayerId) -> u32 {
        self.counts.get(&player).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<PlayerId, u32> {
        &self.counts
    }

    /// Sum of all counts (equals the number of voters)
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn max_votes(&self) -> u32 {
        self.max_votes
    }

    pub fn leaders(&self) -> &[PlayerId] {
        &self.leaders
    }

    /// More than one candidate shares the maximum
    pub fn is_tie(&self) -> bool {
        self.leaders.len() > 1
    }

    /// The plurality winner, ties resolved toward the lowest player id.
    ///
    /// `None` only for an empty vote map.
    pub fn leader(&self) -> Option<PlayerId> {
        self.leaders.first().copied()
    }

    /// `player` received strictly more than half of `electorate` votes
    pub fn has_majority(&self, player: PlayerId, electorate: usize) -> bool {
        is_strict_majority(self.votes_for(player), electorate)
    }
}

/// Strict majority test: `votes > electorate / 2` without float rounding
pub fn is_strict_majority(votes: u32, electorate: usize) -> bool {
    2 * votes as usize > electorate
}

/// Count votes and find the candidates with the maximum count
pub fn tally(votes: &VoteMap) -> VoteTally {
    let mut counts: BTreeMap<PlayerId, u32> = BTreeMap::new();
    for vote in votes.iter() {
        *counts.entry(vote.suspect).or_insert(0) += 1;
    }

    let max_votes = counts.values().copied().max().unwrap_or(0);
    // BTreeMap iteration is ascending, so leaders come out sorted
    let leaders = counts
        .iter()
        .filter(|&(_, &count)| count == max_votes)
        .map(|(&id, _)| id)
        .collect();

    VoteTally {
        counts,
        leaders,
        max_votes,
    }
}
