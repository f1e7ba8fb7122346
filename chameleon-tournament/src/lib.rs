//! Chameleon Tournament - Multi-round orchestration and result reporting
//!
//! This crate provides tournament infrastructure:
//! - Secret word, impostor, and play-order selection per round
//! - Cumulative statistics across categories
//! - Round log records and the result-sink seam
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: play_category, play_scheduled_round (phases)
//! - Level 3: play_order, choose_round (steps)
//! - Level 4: configuration, records, sinks

mod config;
mod record;
mod scheduler;
mod sink;

pub use config::TournamentConfig;
pub use record::{stats_snapshot, PlayerHint, RoundRecord, StatsSnapshot};
pub use scheduler::{play_order, run_tournament, RoundFailure, TournamentResult};
pub use sink::{MemorySink, ResultSink, SinkError};
