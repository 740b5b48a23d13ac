//! End-to-end panel pipeline.
//!
//! Stages run strictly in order: tag target purchases, plan week windows,
//! build the panel, then join household attributes.

use crate::config::PanelConfig;
use crate::core::{enrich_panel, tag_target_purchases, Panel, PanelBuilder, WeekPlan};
use crate::error::Result;
use crate::export::write_panel;
use crate::report::{RunStats, RunSummary};
use crate::transactions::{read_transactions, TransactionTable};
use std::path::Path;
use tracing::info;

/// Build the panel for an in-memory transaction table.
pub fn build_panel(table: TransactionTable, config: &PanelConfig) -> Result<(Panel, RunStats)> {
    config.validate()?;

    let transactions = table.len() as u64;
    let tagged = tag_target_purchases(table, &config.target_commodity)?;

    let plan = WeekPlan::from_days(
        tagged.table().records().iter().map(|t| t.day),
        config.lag_depth,
    )?;
    info!(
        min_day = plan.min_day,
        max_day = plan.max_day,
        num_weeks = plan.num_weeks,
        snapshots = plan.num_weeks_considered,
        "Planned week windows"
    );

    let builder = PanelBuilder::new(&tagged, &plan, config.week_label);
    let mut panel = builder.build()?;

    if config.enrich_attributes {
        enrich_panel(&mut panel, &tagged, config.demographic_order)?;
    }

    let stats = RunStats {
        transactions,
        households: builder.households().len() as u64,
        target_purchases: tagged.target_count() as u64,
        snapshots: panel.snapshot_count() as u64,
        lag_depth: panel.lag_depth() as u64,
        panel_rows: panel.len() as u64,
        enriched: config.enrich_attributes,
    };
    Ok((panel, stats))
}

/// Read `input`, build the panel and write it to `output`.
///
/// Nothing is written unless every stage succeeds.
pub fn run(input: &Path, output: &Path, config: &PanelConfig) -> Result<RunSummary> {
    config.validate()?;
    let mut summary = RunSummary::start(input, output, &config.target_commodity);

    let table = read_transactions(input, config.enrich_attributes)?;
    let (panel, stats) = build_panel(table, config)?;
    write_panel(&panel, output)?;

    summary.stats = stats;
    summary.finish();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeekLabelStyle;
    use crate::error::PanelError;
    use crate::transactions::Transaction;

    fn lag_only(lag_depth: usize) -> PanelConfig {
        PanelConfig {
            lag_depth,
            enrich_attributes: false,
            ..PanelConfig::default()
        }
    }

    #[test]
    fn test_build_panel_stats() {
        let table = TransactionTable::new(vec![
            Transaction::new(1, "B1", 1, "EGGS"),
            Transaction::new(1, "B2", 8, "MILK"),
            Transaction::new(2, "B3", 3, "EGGS"),
        ]);

        let (panel, stats) = build_panel(table, &lag_only(1)).unwrap();
        assert_eq!(panel.week_label(), WeekLabelStyle::Day);
        assert_eq!(stats.transactions, 3);
        assert_eq!(stats.households, 2);
        assert_eq!(stats.target_purchases, 2);
        assert_eq!(stats.snapshots, 1);
        assert_eq!(stats.panel_rows, 2);
        assert!(!stats.enriched);
        assert!(!panel.is_enriched());
    }

    #[test]
    fn test_lag_depth_beyond_history() {
        let table = TransactionTable::new(vec![
            Transaction::new(1, "B1", 1, "EGGS"),
            Transaction::new(1, "B2", 10, "MILK"),
        ]);

        let err = build_panel(table, &lag_only(4)).unwrap_err();
        assert!(matches!(err, PanelError::Configuration(_)));
    }

    #[test]
    fn test_oversized_lag_depth_is_rejected() {
        let table = TransactionTable::new(vec![
            Transaction::new(1, "B1", 1, "EGGS"),
            Transaction::new(1, "B2", 28, "MILK"),
        ]);

        let err = build_panel(table, &lag_only(usize::MAX)).unwrap_err();
        assert!(matches!(err, PanelError::Configuration(_)));
    }

    #[test]
    fn test_enriched_by_default() {
        let table = TransactionTable::new(vec![
            Transaction::new(5, "B1", 1, "EGGS").with_spend(1.0, 0.0),
            Transaction::new(5, "B2", 14, "MILK").with_spend(2.0, -0.5),
        ]);
        let config = PanelConfig {
            lag_depth: 2,
            ..PanelConfig::default()
        };

        let (panel, stats) = build_panel(table, &config).unwrap();
        assert!(stats.enriched);
        assert!(panel.is_enriched());
        assert_eq!(panel.rows()[0].lags, vec![0, 1]);
    }
}
