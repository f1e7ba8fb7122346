//! Player identities and the roster registry

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Opaque player identifier: the player's position in the roster.
///
/// Ordering follows roster order, which is also the tie policy used when a
/// tie-break vote ties again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl PlayerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An agent taking part in the game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Stable identifier (e.g. the backing model name); keys the stats snapshot
    pub key: String,
    /// Human-readable name used in prompts and logs
    pub name: String,
}

/// Immutable registry of players, built once and shared by reference
#[derive(Clone, Debug)]
pub struct Roster {
    players: Vec<Player>,
    /// Lowercased display name -> id
    by_name: FxHashMap<String, PlayerId>,
}

impl Roster {
    /// Build a roster from `(key, name)` pairs in canonical order.
    ///
    /// Keys and display names must be unique (names case-insensitively).
    pub fn new<I, K, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<String>,
    {
        let mut players = Vec::new();
        let mut by_name = FxHashMap::default();

        for (i, (key, name)) in entries.into_iter().enumerate() {
            let key = key.into();
            let name = name.into();
            let id = PlayerId(i);

            if players.iter().any(|p: &Player| p.key == key) {
                return Err(CoreError::DuplicatePlayer(key));
            }
            if by_name.insert(name.to_lowercase(), id).is_some() {
                return Err(CoreError::DuplicatePlayer(name));
            }
            players.push(Player { id, key, name });
        }

        if players.is_empty() {
            return Err(CoreError::EmptyRoster);
        }

        Ok(Self { players, by_name })
    }

    /// The five-agent roster the game was designed around
    pub fn standard() -> Self {
        let players = vec![
            ("gpt-4o-mini", "Alice"),
            ("o1-mini", "Bob"),
            ("claude-3-5-sonnet-latest", "Charlie"),
            ("claude-3-5-haiku-latest", "David"),
            ("gemini-1.5-flash", "Eve"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (key, name))| Player {
            id: PlayerId(i),
            key: key.to_string(),
            name: name.to_string(),
        })
        .collect::<Vec<_>>();

        let by_name = players
            .iter()
            .map(|p| (p.name.to_lowercase(), p.id))
            .collect();

        Self { players, by_name }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in canonical order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Ids in canonical order
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.0)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        id.0 < self.players.len()
    }

    /// Display name, or the raw id for ids outside the roster
    pub fn name(&self, id: PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }

    pub fn find_by_key(&self, key: &str) -> Option<PlayerId> {
        self.players.iter().find(|p| p.key == key).map(|p| p.id)
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_roster() {
        let roster = Roster::standard();
        assert_eq!(roster.len(), 5);
        assert_eq!(roster.name(PlayerId(0)), "Alice");
        assert_eq!(roster.name(PlayerId(4)), "Eve");
        assert_eq!(roster.get(PlayerId(2)).unwrap().key, "claude-3-5-sonnet-latest");
    }

    #[test]
    fn test_ids_follow_canonical_order() {
        let roster = Roster::new([("a", "Ann"), ("b", "Ben"), ("c", "Cat")]).unwrap();
        let ids: Vec<_> = roster.ids().collect();
        assert_eq!(ids, vec![PlayerId(0), PlayerId(1), PlayerId(2)]);
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let roster = Roster::standard();
        assert_eq!(roster.find_by_name("charlie"), Some(PlayerId(2)));
        assert_eq!(roster.find_by_name("  EVE "), Some(PlayerId(4)));
        assert_eq!(roster.find_by_name("Mallory"), None);
    }

    #[test]
    fn test_find_by_key() {
        let roster = Roster::standard();
        assert_eq!(roster.find_by_key("o1-mini"), Some(PlayerId(1)));
        assert_eq!(roster.find_by_key("Bob"), None);
    }

    #[test]
    fn test_empty_roster_rejected() {
        let entries: Vec<(String, String)> = Vec::new();
        assert!(matches!(Roster::new(entries), Err(CoreError::EmptyRoster)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Roster::new([("a", "Ann"), ("b", "ANN")]);
        assert!(matches!(result, Err(CoreError::DuplicatePlayer(_))));

        let result = Roster::new([("a", "Ann"), ("a", "Ben")]);
        assert!(matches!(result, Err(CoreError::DuplicatePlayer(_))));
    }

    #[test]
    fn test_name_for_unknown_id() {
        let roster = Roster::standard();
        assert!(!roster.contains(PlayerId(9)));
        assert_eq!(roster.name(PlayerId(9)), "#9");
    }
}
