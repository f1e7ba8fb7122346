//! Roster file - who plays, and which provider backs each player

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chameleon_core::{CoreError, RandomProvider, ReasoningProvider, Roster, RoutedProvider};

use crate::chat_provider::{ChatConfig, ChatProvider};

/// Backend answering for a player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline uniform-random agent
    #[default]
    Random,
    /// OpenAI-compatible chat-completions endpoint, model = player key
    Chat,
}

/// One line of the roster file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Display name used in prompts and logs
    pub name: String,
    /// Stable identity; also the model name for chat players
    pub key: String,
    #[serde(default)]
    pub provider: ProviderKind,
}

impl RosterEntry {
    pub fn new(name: &str, key: &str, provider: ProviderKind) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
            provider,
        }
    }
}

/// Parsed roster file, in canonical player order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterConfig {
    pub entries: Vec<RosterEntry>,
}

impl Default for RosterConfig {
    /// The standard five players, all offline
    fn default() -> Self {
        let roster = Roster::standard();
        Self {
            entries: roster
                .players()
                .iter()
                .map(|p| RosterEntry::new(&p.name, &p.key, ProviderKind::Random))
                .collect(),
        }
    }
}

impl RosterConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse roster file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the default roster
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn roster(&self) -> Result<Roster, CoreError> {
        Roster::new(self.entries.iter().map(|e| (e.key.as_str(), e.name.as_str())))
    }

    pub fn uses_chat(&self) -> bool {
        self.entries.iter().any(|e| e.provider == ProviderKind::Chat)
    }

    /// Bind every chat player to a chat provider; everyone else shares one
    /// random provider.
    ///
    /// Entry order matches `roster()`, so entry `i` is `PlayerId(i)`.
    pub fn build_provider(
        &self,
        roster: &Roster,
        seed: Option<u64>,
        chat: &ChatConfig,
    ) -> Result<RoutedProvider> {
        let mut provider = RoutedProvider::new(Box::new(RandomProvider::new(seed)));

        for (entry, id) in self.entries.iter().zip(roster.ids()) {
            if entry.provider != ProviderKind::Chat {
                continue;
            }
            let player_seed = seed.map(|s| s.wrapping_add(id.index() as u64 + 1));
            let chat_provider: Box<dyn ReasoningProvider> = Box::new(
                ChatProvider::new(chat.clone(), player_seed)
                    .with_context(|| format!("Failed to set up chat provider for {}", entry.name))?,
            );
            tracing::info!("{} plays through chat model {}", entry.name, entry.key);
            provider = provider.with_route(id, chat_provider);
        }

        Ok(provider)
    }
}
