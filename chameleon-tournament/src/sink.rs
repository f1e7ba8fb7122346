//! Result sinks - where round logs and final stats go

use crate::record::{RoundRecord, StatsSnapshot};

/// Errors raised while persisting results
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Receives structured results as the tournament progresses.
///
/// `record_round` is called after every round so partial progress survives
/// an interrupted run; `record_stats` once at the end.
pub trait ResultSink {
    fn record_round(&mut self, record: &RoundRecord) -> Result<(), SinkError>;

    fn record_stats(&mut self, stats: &StatsSnapshot) -> Result<(), SinkError>;
}

/// Keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rounds: Vec<RoundRecord>,
    pub stats: Option<StatsSnapshot>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    fn record_round(&mut self, record: &RoundRecord) -> Result<(), SinkError> {
        self.rounds.push(record.clone());
        Ok(())
    }

    fn record_stats(&mut self, stats: &StatsSnapshot) -> Result<(), SinkError> {
        self.stats = Some(stats.clone());
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn record_round(&mut self, record: &RoundRecord) -> Result<(), SinkError> {
        (**self).record_round(record)
    }

    fn record_stats(&mut self, stats: &StatsSnapshot) -> Result<(), SinkError> {
        (**self).record_stats(stats)
    }
}
