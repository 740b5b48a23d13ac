//! Summary of a single pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Counts gathered while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Transaction rows read
    pub transactions: u64,
    /// Distinct households in the table
    pub households: u64,
    /// Rows tagged as target purchases
    pub target_purchases: u64,
    /// Snapshot weeks in the panel
    pub snapshots: u64,
    /// Lag features per snapshot
    pub lag_depth: u64,
    /// Rows written to the panel file
    pub panel_rows: u64,
    /// Whether household attributes were joined
    pub enriched: bool,
}

/// Record of one run, printed at the end and optionally saved as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub target_commodity: String,
    pub stats: RunStats,
}

impl RunSummary {
    /// Start a summary for a run between two resolved paths.
    pub fn start(input: &Path, output: &Path, target_commodity: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            target_commodity: target_commodity.to_string(),
            stats: RunStats::default(),
        }
    }

    /// Mark the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Seconds between start and finish, if finished.
    pub fn duration_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = &self.stats;
        let duration = self
            .duration_secs()
            .map(|secs| format!("{secs:.2} seconds"))
            .unwrap_or_else(|| "in progress".to_string());
        format!(
            "Run Summary ({}):\n\
             - Input: {}\n\
             - Output: {}\n\
             - Transactions read: {}\n\
             - Households: {}\n\
             - {} purchases: {}\n\
             - Snapshot weeks: {}\n\
             - Lag weeks per snapshot: {}\n\
             - Panel rows written: {}\n\
             - Household attributes: {}\n\
             - Duration: {}",
            self.run_id,
            self.input.display(),
            self.output.display(),
            stats.transactions,
            stats.households,
            self.target_commodity,
            stats.target_purchases,
            stats.snapshots,
            stats.lag_depth,
            stats.panel_rows,
            if stats.enriched { "joined" } else { "skipped" },
            duration
        )
    }

    /// Save the summary as JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let mut summary =
            RunSummary::start(Path::new("raw/tx.csv"), Path::new("out/panel.csv"), "EGGS");
        summary.stats.transactions = 12;
        summary.stats.households = 3;

        let text = summary.summary();
        assert!(text.contains("Transactions read: 12"));
        assert!(text.contains("Households: 3"));
        assert!(text.contains("EGGS purchases: 0"));
        assert!(text.contains("in progress"));

        summary.finish();
        assert!(summary.duration_secs().is_some());
        assert!(summary.summary().contains("seconds"));
    }

    #[test]
    fn test_save_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let mut summary = RunSummary::start(Path::new("in.csv"), Path::new("out.csv"), "EGGS");
        summary.stats.panel_rows = 40;
        summary.finish();

        summary.save(&path).unwrap();
        let loaded: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.run_id, summary.run_id);
        assert_eq!(loaded.stats, summary.stats);
    }
}
