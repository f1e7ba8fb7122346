//! JSON result files for a tournament run
//!
//! The detailed log is a single JSON array rewritten after every round, so
//! an interrupted run still leaves a readable file behind.

use std::path::{Path, PathBuf};

use chameleon_tournament::{ResultSink, RoundRecord, SinkError, StatsSnapshot};

/// Writes `chameleon_detailed_log_<stamp>.json` and
/// `chameleon_stats_<stamp>.json` into one directory
pub struct JsonFileSink {
    log_path: PathBuf,
    stats_path: PathBuf,
    records: Vec<RoundRecord>,
}

impl JsonFileSink {
    /// `stamp` distinguishes runs, e.g. `20250101_120000`
    pub fn new(dir: &Path, stamp: &str) -> Self {
        Self {
            log_path: dir.join(format!("chameleon_detailed_log_{}.json", stamp)),
            stats_path: dir.join(format!("chameleon_stats_{}.json", stamp)),
            records: Vec::new(),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }
}

impl ResultSink for JsonFileSink {
    fn record_round(&mut self, record: &RoundRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        let content = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.log_path, content)?;
        Ok(())
    }

    fn record_stats(&mut self, stats: &StatsSnapshot) -> Result<(), SinkError> {
        let content = serde_json::to_string_pretty(stats)?;
        std::fs::write(&self.stats_path, content)?;
        tracing::info!("Saved statistics to {}", self.stats_path.display());
        Ok(())
    }
}
