//! Chameleon CLI - commands and adapters for the `chameleon` binary
//!
//! - `play_cmd`: run a tournament and write result files
//! - `list_cmd`: inspect the dataset and roster
//! - `roster_config`: roster file and provider wiring
//! - `chat_provider`: agents backed by a chat-completions endpoint
//! - `json_sink`: JSON round log and statistics files

pub mod chat_provider;
pub mod json_sink;
pub mod list_cmd;
pub mod play_cmd;
pub mod roster_config;

pub use chat_provider::{ChatConfig, ChatError, ChatProvider};
pub use json_sink::JsonFileSink;
pub use roster_config::{ProviderKind, RosterConfig, RosterEntry};
