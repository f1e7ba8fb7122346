//! Chat provider - agents backed by an OpenAI-compatible chat endpoint
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: ReasoningProvider impl - one method per game decision
//! - Level 2: ask() - send a prompt, log and swallow transport failures
//! - Level 3: complete() - the HTTP round trip
//! - Level 4: prompt builders, configuration

use std::sync::Mutex;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use chameleon_core::{
    fallback_choice, resolve_guess, resolve_vote, sanitize_hint, GuessRequest, HintRequest,
    Player, PlayerId, ReasoningProvider, Roster, TieBreakRequest, Turn, VoteRequest,
};

/// Instructions sent with every request
pub const SYSTEM_PROMPT: &str = "You are a player in a game of Chameleon. A category card lists \
the possible words and one of them is secret. Every player except one knows the secret word; \
that player is the Chameleon. On your turn give a one-word clue. A clue should show the others \
that you know the word without handing it to the Chameleon. As the Chameleon, give a clue that \
keeps you from being suspected. Always answer with a single word or name. After the clues \
everyone votes on who the Chameleon is. The Chameleon wins by escaping the vote, or by naming \
the secret word after being caught. Everyone else wins by voting out the Chameleon.";

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

// ============================================================================
// CONFIGURATION (Level 4)
// ============================================================================

/// Endpoint settings shared by every chat player
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Chat-completions URL
    pub api_url: String,
    /// Bearer token, if the endpoint needs one
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ChatConfig {
    /// Read `CHAMELEON_API_URL` and `CHAMELEON_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("CHAMELEON_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: std::env::var("CHAMELEON_API_KEY").ok().filter(|k| !k.is_empty()),
            ..Default::default()
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors from a single chat request
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Empty response")]
    EmptyResponse,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// A player whose decisions come from a chat model named by the player key.
///
/// Every response is reduced to a legal value here: unusable hints become
/// `pass`, unreadable votes fall back to a random legal choice.
pub struct ChatProvider {
    client: reqwest::blocking::Client,
    config: ChatConfig,
    /// Fallback choices only
    rng: Mutex<ChaCha8Rng>,
}

impl ChatProvider {
    pub fn new(config: ChatConfig, seed: Option<u64>) -> Result<Self, ChatError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            client,
            config,
            rng: Mutex::new(rng),
        })
    }

    // ========================================================================
    // Level 2 - Prompt exchange
    // ========================================================================

    /// Send `prompt` as `player`. Failures are logged and yield `None`.
    fn ask(&self, player: &Player, prompt: &str) -> Option<String> {
        match self.complete(&player.key, prompt) {
            Ok(text) => {
                tracing::debug!("{} ({}) replied: {}", player.name, player.key, text);
                Some(text)
            }
            Err(e) => {
                tracing::warn!("Chat request for {} failed: {}", player.name, e);
                None
            }
        }
    }

    /// Random legal ballot, avoiding the voter where possible
    fn fallback_vote(&self, player: &Player, candidates: &[PlayerId]) -> PlayerId {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let choice = fallback_choice(&mut *rng, candidates, player.id).unwrap_or(player.id);
        tracing::warn!(
            "{} gave no usable vote, falling back to a random choice",
            player.name
        );
        choice
    }

    // ========================================================================
    // Level 3 - HTTP
    // ========================================================================

    fn complete(&self, model: &str, prompt: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut builder = self.client.post(&self.config.api_url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        let parsed: ChatResponse = response.json()?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }
}

// ============================================================================
// LEVEL 1 - GAME DECISIONS
// ============================================================================

impl ReasoningProvider for ChatProvider {
    fn hint(&self, request: &HintRequest<'_>) -> String {
        let reply = self
            .ask(request.player, &hint_prompt(request))
            .unwrap_or_default();
        sanitize_hint(&reply, request.secret_word)
    }

    fn vote(&self, request: &VoteRequest<'_>) -> PlayerId {
        let everyone: Vec<PlayerId> = request.roster.ids().collect();
        self.ask(request.player, &vote_prompt(request))
            .and_then(|reply| resolve_vote(&reply, request.roster, &everyone))
            .unwrap_or_else(|| self.fallback_vote(request.player, &everyone))
    }

    fn tie_break_vote(&self, request: &TieBreakRequest<'_>) -> PlayerId {
        self.ask(request.player, &tie_break_prompt(request))
            .and_then(|reply| resolve_vote(&reply, request.roster, request.candidates))
            .unwrap_or_else(|| self.fallback_vote(request.player, request.candidates))
    }

    fn guess(&self, request: &GuessRequest<'_>) -> String {
        match self.ask(request.player, &guess_prompt(request)) {
            Some(reply) => resolve_guess(&reply, &request.category.words),
            None => String::new(),
        }
    }
}

// ============================================================================
// PROMPT BUILDERS (Level 4)
// ============================================================================

fn card_line(category: &str, words: &[String]) -> String {
    format!(
        "The category is '{}'. The possible words are: {}.",
        category,
        words.join(", ")
    )
}

fn hints_block(turns: &[Turn], roster: &Roster) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}\n", roster.name(t.player), t.hint))
        .collect()
}

fn names(ids: impl IntoIterator<Item = PlayerId>, roster: &Roster) -> String {
    ids.into_iter()
        .map(|id| roster.name(id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn hint_prompt(request: &HintRequest<'_>) -> String {
    let mut prompt = card_line(&request.category.name, &request.category.words);
    match request.secret_word {
        Some(word) => prompt.push_str(&format!(" The secret word is '{}'.", word)),
        None => prompt.push_str(" You are the Chameleon and do not know the secret word."),
    }
    if !request.prior_hints.is_empty() {
        prompt.push_str("\nClues so far:\n");
        prompt.push_str(&hints_block(request.prior_hints, request.roster));
    }
    prompt.push_str("\nGive your one-word clue:");
    prompt
}

pub fn vote_prompt(request: &VoteRequest<'_>) -> String {
    let mut prompt = format!("You are {}. ", request.player.name);
    prompt.push_str(&card_line(&request.category.name, &request.category.words));
    match request.secret_word {
        Some(word) => prompt.push_str(&format!(" The secret word is '{}'.", word)),
        None => prompt.push_str(" You are the Chameleon; vote so as not to draw suspicion."),
    }
    prompt.push_str("\nAll clues:\n");
    prompt.push_str(&hints_block(request.hints, request.roster));
    prompt.push_str(&format!(
        "\nWho is the Chameleon? Answer with one name: {}.",
        names(request.roster.ids(), request.roster)
    ));
    prompt
}

pub fn tie_break_prompt(request: &TieBreakRequest<'_>) -> String {
    let mut prompt = format!("You are {}. ", request.player.name);
    prompt.push_str(&card_line(&request.category.name, &request.category.words));
    match request.visible_word() {
        Some(word) => prompt.push_str(&format!(" The secret word is '{}'.", word)),
        None => prompt.push_str(" You are the Chameleon; vote so as not to draw suspicion."),
    }
    prompt.push_str("\nAll clues:\n");
    prompt.push_str(&hints_block(request.hints, request.roster));
    prompt.push_str(&format!(
        "\nThe vote was tied between {}. Who is the Chameleon? Answer with one of those names.",
        names(request.candidates.iter().copied(), request.roster)
    ));
    prompt
}

pub fn guess_prompt(request: &GuessRequest<'_>) -> String {
    let mut prompt = format!("You are {} and you are the Chameleon. ", request.player.name);
    prompt.push_str(&card_line(&request.category.name, &request.category.words));
    prompt.push_str("\nClues from every player:\n");
    prompt.push_str(&hints_block(request.hints, request.roster));
    prompt.push_str(
        "\nWhich word from the list is the secret word? Naming it correctly wins the round. \
         Answer with exactly one word or phrase from the list.",
    );
    prompt
}
