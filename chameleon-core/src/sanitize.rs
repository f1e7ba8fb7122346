//! Turning free-text agent responses into game values
//!
//! Providers backed by free-text generators run every response through
//! these helpers before handing a value to the round engine.

use crate::player::{PlayerId, Roster};

/// Hint substituted when a response contains no usable word
pub const EMPTY_HINT: &str = "pass";

/// Hint substituted when a player gives away the secret word
pub const INVALID_HINT: &str = "invalid";

/// Case-insensitive, whitespace-trimmed word comparison
pub fn words_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Reduce a response to a single-word hint.
///
/// Takes the first word, stripped of surrounding punctuation. A hint equal
/// to the secret word is replaced with [`INVALID_HINT`].
pub fn sanitize_hint(text: &str, secret_word: Option<&str>) -> String {
    let word = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|w| !w.is_empty());

    match word {
        None => EMPTY_HINT.to_string(),
        Some(w) if secret_word.is_some_and(|s| words_match(w, s)) => INVALID_HINT.to_string(),
        Some(w) => w.to_string(),
    }
}

/// Find the player a vote response names, restricted to `candidates`.
///
/// Returns the candidate whose display name appears first in the text as a
/// whole word, or `None` if no candidate is named.
pub fn resolve_vote(text: &str, roster: &Roster, candidates: &[PlayerId]) -> Option<PlayerId> {
    if let Some(id) = roster.find_by_name(text) {
        if candidates.contains(&id) {
            return Some(id);
        }
    }

    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    // Match multi-word names against windows of the token stream
    tokens.iter().enumerate().find_map(|(start, _)| {
        candidates.iter().copied().find(|&id| {
            let Some(player) = roster.get(id) else {
                return false;
            };
            let name = player.name.to_lowercase();
            let parts: Vec<&str> = name
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .collect();
            !parts.is_empty()
                && tokens.len() >= start + parts.len()
                && tokens[start..start + parts.len()] == parts[..]
        })
    })
}

/// Map a guess response onto the candidate word it names.
///
/// Picks the longest candidate contained in the text (case-insensitive), so
/// "New York" wins over "York". Falls back to the whole response, trimmed.
pub fn resolve_guess(text: &str, words: &[String]) -> String {
    let lowered = text.to_lowercase();

    let best = words
        .iter()
        .filter(|w| !w.trim().is_empty() && lowered.contains(&w.trim().to_lowercase()))
        .max_by_key(|w| w.trim().chars().count());

    match best {
        Some(word) => word.clone(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_words_match() {
        assert!(words_match("  Paris ", "paris"));
        assert!(words_match("POKÉMON", "Pokémon"));
        assert!(!words_match("Paris", "Rome"));
    }

    #[test]
    fn test_sanitize_hint_takes_first_word() {
        assert_eq!(sanitize_hint("Stripes, definitely.", None), "Stripes");
        assert_eq!(sanitize_hint("  \"Roar!\" is my hint", Some("Lion")), "Roar");
    }

    #[test]
    fn test_sanitize_hint_empty() {
        assert_eq!(sanitize_hint("", None), EMPTY_HINT);
        assert_eq!(sanitize_hint(" ... !!", None), EMPTY_HINT);
    }

    #[test]
    fn test_sanitize_hint_rejects_secret_word() {
        assert_eq!(sanitize_hint("lion", Some("Lion")), INVALID_HINT);
        // The impostor does not know the word, so nothing to compare against
        assert_eq!(sanitize_hint("lion", None), "lion");
    }

    #[test]
    fn test_resolve_vote_by_name() {
        let roster = Roster::standard();
        let all: Vec<_> = roster.ids().collect();
        assert_eq!(resolve_vote("Charlie", &roster, &all), Some(PlayerId(2)));
        assert_eq!(
            resolve_vote("I think it's david, his hint was odd.", &roster, &all),
            Some(PlayerId(3))
        );
    }

    #[test]
    fn test_resolve_vote_first_mention_wins() {
        let roster = Roster::standard();
        let all: Vec<_> = roster.ids().collect();
        assert_eq!(
            resolve_vote("Not Bob. Eve is the Chameleon.", &roster, &all),
            Some(PlayerId(1))
        );
    }

    #[test]
    fn test_resolve_vote_respects_candidates() {
        let roster = Roster::standard();
        let tied = [PlayerId(0), PlayerId(4)];
        assert_eq!(resolve_vote("Bob", &roster, &tied), None);
        assert_eq!(resolve_vote("Bob or maybe Eve", &roster, &tied), Some(PlayerId(4)));
    }

    #[test]
    fn test_resolve_vote_whole_words_only() {
        let roster = Roster::standard();
        let all: Vec<_> = roster.ids().collect();
        // "Eve" inside "never" is not a vote
        assert_eq!(resolve_vote("I never know", &roster, &all), None);
    }

    #[test]
    fn test_resolve_vote_multi_word_name() {
        let roster = Roster::new([("a", "Mary Ann"), ("b", "Ann")]).unwrap();
        let all: Vec<_> = roster.ids().collect();
        assert_eq!(resolve_vote("my vote: mary ann", &roster, &all), Some(PlayerId(0)));
    }

    #[test]
    fn test_resolve_guess_prefers_longest_candidate() {
        let list = words(&["York", "New York", "Paris"]);
        assert_eq!(resolve_guess("I'd say new york.", &list), "New York");
        assert_eq!(resolve_guess("PARIS", &list), "Paris");
    }

    #[test]
    fn test_resolve_guess_fallback() {
        let list = words(&["Paris"]);
        assert_eq!(resolve_guess("  Atlantis  ", &list), "Atlantis");
        assert_eq!(
            resolve_guess("\n Lost city\nof Atlantis \n", &list),
            "Lost city\nof Atlantis"
        );
        assert_eq!(resolve_guess("", &list), "");
    }
}
