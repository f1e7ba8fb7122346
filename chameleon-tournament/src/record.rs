//! Display-name-keyed projections of rounds and stats for result sinks

use std::collections::BTreeMap;

use chameleon_core::{PlayerStats, Roster, Round, StatsTable, VoteMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hint as it appears in the log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHint {
    pub player: String,
    pub hint: String,
}

/// Log entry written after every round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub timestamp: DateTime<Utc>,
    /// 1-based position in the tournament
    pub round_number: usize,
    pub category: String,
    pub secret_word: String,
    pub impostor: String,
    /// In play order
    pub player_hints: Vec<PlayerHint>,
    /// Voter name -> suspect name
    pub initial_votes: BTreeMap<String, String>,
    pub tie_break_votes: Option<BTreeMap<String, String>>,
    pub final_suspect: String,
    pub impostor_guess: String,
    pub winner: Option<String>,
    pub was_impostor_caught: bool,
    pub did_impostor_guess_correctly: bool,
}

impl RoundRecord {
    pub fn from_round(
        round: &Round,
        round_number: usize,
        roster: &Roster,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            round_number,
            category: round.category.clone(),
            secret_word: round.secret_word.clone(),
            impostor: roster.name(round.impostor),
            player_hints: round
                .turns
                .iter()
                .map(|turn| PlayerHint {
                    player: roster.name(turn.player),
                    hint: turn.hint.clone(),
                })
                .collect(),
            initial_votes: votes_by_name(&round.votes, roster),
            tie_break_votes: round
                .tie_break
                .as_ref()
                .map(|tb| votes_by_name(&tb.votes, roster)),
            final_suspect: roster.name(round.final_suspect),
            impostor_guess: round.guess.clone(),
            winner: round.winner.map(|w| roster.name(w)),
            was_impostor_caught: round.caught(),
            did_impostor_guess_correctly: round.guessed_correctly(),
        }
    }
}

fn votes_by_name(votes: &VoteMap, roster: &Roster) -> BTreeMap<String, String> {
    votes
        .iter()
        .map(|v| (roster.name(v.voter), roster.name(v.suspect)))
        .collect()
}

/// Final per-player counters keyed by stable player key
pub type StatsSnapshot = BTreeMap<String, PlayerStats>;

pub fn stats_snapshot(stats: &StatsTable, roster: &Roster) -> StatsSnapshot {
    stats
        .iter()
        .filter_map(|(id, s)| roster.get(id).map(|p| (p.key.clone(), *s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chameleon_core::{determine_winner, PlayerId, TieBreak, Turn, Vote};

    fn sample_round(tie_break: bool) -> Round {
        let ids: Vec<PlayerId> = (0..5).map(PlayerId).collect();
        let suspects = [1, 0, 1, 0, 2].map(PlayerId);
        let votes = VoteMap::from_votes(
            ids.iter()
                .zip(suspects)
                .map(|(&voter, suspect)| Vote { voter, suspect })
                .collect(),
        );
        Round {
            category: "Fruits".to_string(),
            secret_word: "Mango".to_string(),
            impostor: PlayerId(1),
            turns: ids
                .iter()
                .enumerate()
                .map(|(index, &player)| Turn {
                    player,
                    index,
                    hint: format!("h{index}"),
                    is_impostor: player == PlayerId(1),
                })
                .collect(),
            votes: votes.clone(),
            tie_break: tie_break.then(|| TieBreak {
                candidates: vec![PlayerId(0), PlayerId(1)],
                votes: VoteMap::from_votes(
                    ids.iter()
                        .map(|&voter| Vote { voter, suspect: PlayerId(1) })
                        .collect(),
                ),
            }),
            final_suspect: PlayerId(1),
            guess: "mango".to_string(),
            winner: determine_winner(PlayerId(1), PlayerId(1), "mango", "Mango"),
        }
    }

    #[test]
    fn test_record_uses_display_names() {
        let roster = Roster::standard();
        let record = RoundRecord::from_round(&sample_round(false), 3, &roster, Utc::now());

        assert_eq!(record.round_number, 3);
        assert_eq!(record.impostor, "Bob");
        assert_eq!(record.player_hints[0], PlayerHint { player: "Alice".into(), hint: "h0".into() });
        assert_eq!(record.initial_votes["Eve"], "Charlie");
        assert_eq!(record.initial_votes.len(), 5);
        assert!(record.tie_break_votes.is_none());
        assert_eq!(record.final_suspect, "Bob");
        assert_eq!(record.winner.as_deref(), Some("Bob"));
        assert!(record.was_impostor_caught);
        assert!(record.did_impostor_guess_correctly);
    }

    #[test]
    fn test_record_includes_tie_break() {
        let roster = Roster::standard();
        let record = RoundRecord::from_round(&sample_round(true), 1, &roster, Utc::now());
        let tie = record.tie_break_votes.expect("tie-break votes");
        assert!(tie.values().all(|s| s == "Bob"));
    }

    #[test]
    fn test_record_serializes_absent_winner_as_null() {
        let roster = Roster::standard();
        let mut round = sample_round(false);
        round.guess = "Kiwi".to_string();
        round.winner = None;
        let record = RoundRecord::from_round(&round, 1, &roster, Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["winner"].is_null());
        assert_eq!(json["did_impostor_guess_correctly"], false);
        assert_eq!(json["player_hints"][4]["player"], "Eve");
    }

    #[test]
    fn test_stats_snapshot_keyed_by_player_key() {
        let roster = Roster::standard();
        let mut stats = StatsTable::new(roster.len());
        stats.record(&sample_round(false)).unwrap();

        let snapshot = stats_snapshot(&stats, &roster);
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot["o1-mini"].times_as_impostor, 1);
        assert_eq!(snapshot["gpt-4o-mini"].correct_votes, 1);
    }
}
