//! Household-week panel construction.
//!
//! Each snapshot is cut at a day `D` and holds one row per household in the
//! whole table. Lag feature `k` is 1 when the household made at least one
//! target purchase in the 7-day block ending `k` weeks before `D`, and 0
//! otherwise, including when the household has no rows in that block.

use crate::config::WeekLabelStyle;
use crate::core::attributes::HouseholdAttributes;
use crate::core::tagger::TaggedTable;
use crate::core::windowing::WeekPlan;
use crate::error::{PanelError, Result};
use crate::transactions::{HouseholdKey, Transaction, TransactionTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Prefix of the lag feature columns.
pub const LAG_COLUMN_PREFIX: &str = "eggPurchase_week";

/// Output column name for lag offset `lag`.
pub fn lag_column_name(lag: usize) -> String {
    format!("{LAG_COLUMN_PREFIX}{lag}")
}

/// One (household, snapshot) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub household_key: HouseholdKey,
    /// Rows with a basket id for this household across the whole table
    pub num_baskets: u64,
    /// Snapshot cutoff day
    pub cutoff_day: i64,
    /// 0/1 lag features, index = lag offset
    pub lags: Vec<u8>,
    /// Joined household attributes, present once enrichment has run
    pub attributes: Option<HouseholdAttributes>,
}

impl PanelRow {
    pub fn attributes_mut(&mut self) -> &mut HouseholdAttributes {
        self.attributes.get_or_insert_with(HouseholdAttributes::default)
    }
}

/// The rows of a single snapshot.
#[derive(Debug, Clone)]
pub struct PanelFragment {
    pub cutoff_day: i64,
    pub lag_depth: usize,
    pub rows: Vec<PanelRow>,
}

/// The household x snapshot-week feature table.
#[derive(Debug, Clone)]
pub struct Panel {
    lag_depth: usize,
    week_label: WeekLabelStyle,
    rows: Vec<PanelRow>,
    snapshots: usize,
}

impl Panel {
    pub fn new(lag_depth: usize, week_label: WeekLabelStyle) -> Self {
        Self {
            lag_depth,
            week_label,
            rows: Vec::new(),
            snapshots: 0,
        }
    }

    /// Append a snapshot's rows.
    ///
    /// Every fragment must carry the panel's lag columns.
    pub fn append(&mut self, fragment: PanelFragment) -> Result<()> {
        let mismatched = fragment.lag_depth != self.lag_depth
            || fragment.rows.iter().any(|r| r.lags.len() != self.lag_depth);
        if mismatched {
            return Err(PanelError::Schema(format!(
                "snapshot cut at day {} does not carry {} lag column(s)",
                fragment.cutoff_day, self.lag_depth
            )));
        }

        self.rows.extend(fragment.rows);
        self.snapshots += 1;
        Ok(())
    }

    /// Left-join per-household values onto every row.
    ///
    /// `apply` receives each matching right-hand value (or `None` when the
    /// household has none). The join fails if it changes the row count.
    pub fn left_join<V, F>(&mut self, join: &str, right: &[(HouseholdKey, V)], mut apply: F) -> Result<()>
    where
        F: FnMut(&mut PanelRow, Option<&V>),
    {
        let mut index: HashMap<&HouseholdKey, Vec<&V>> = HashMap::new();
        for (key, value) in right {
            index.entry(key).or_default().push(value);
        }

        let before = self.rows.len();
        let mut joined = Vec::with_capacity(before);
        for row in self.rows.drain(..) {
            match index.get(&row.household_key) {
                Some(matches) => {
                    for value in matches {
                        let mut out = row.clone();
                        apply(&mut out, Some(*value));
                        joined.push(out);
                    }
                }
                None => {
                    let mut out = row;
                    apply(&mut out, None);
                    joined.push(out);
                }
            }
        }

        let after = joined.len();
        if after != before {
            return Err(PanelError::JoinCardinality {
                join: join.to_string(),
                before,
                after,
            });
        }

        self.rows = joined;
        debug!(join, rows = after, "Joined household values");
        Ok(())
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lag_depth(&self) -> usize {
        self.lag_depth
    }

    pub fn week_label(&self) -> WeekLabelStyle {
        self.week_label
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots
    }

    /// Whether attribute enrichment has run on this panel.
    pub fn is_enriched(&self) -> bool {
        self.rows.first().is_some_and(|r| r.attributes.is_some())
    }
}

/// Every household in the table with its basket count.
#[derive(Debug, Clone, Default)]
pub struct HouseholdIndex {
    baskets: BTreeMap<HouseholdKey, u64>,
}

impl HouseholdIndex {
    pub fn from_table(table: &TransactionTable) -> Self {
        let mut baskets = BTreeMap::new();
        for transaction in table.records() {
            let count = baskets.entry(transaction.household_key.clone()).or_insert(0u64);
            if transaction.basket_id.is_some() {
                *count += 1;
            }
        }
        Self { baskets }
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }

    /// Households in key order with their basket counts.
    pub fn iter(&self) -> impl Iterator<Item = (&HouseholdKey, u64)> {
        self.baskets.iter().map(|(key, &count)| (key, count))
    }
}

/// Builds the panel from a tagged table and a week plan.
pub struct PanelBuilder<'a> {
    tagged: &'a TaggedTable,
    plan: &'a WeekPlan,
    week_label: WeekLabelStyle,
    households: HouseholdIndex,
}

impl<'a> PanelBuilder<'a> {
    pub fn new(tagged: &'a TaggedTable, plan: &'a WeekPlan, week_label: WeekLabelStyle) -> Self {
        Self {
            tagged,
            plan,
            week_label,
            households: HouseholdIndex::from_table(tagged.table()),
        }
    }

    pub fn households(&self) -> &HouseholdIndex {
        &self.households
    }

    /// Build every snapshot and concatenate them, latest first.
    pub fn build(&self) -> Result<Panel> {
        let mut panel = Panel::new(self.plan.lag_depth, self.week_label);
        for week in 0..self.plan.num_weeks_considered {
            panel.append(self.build_snapshot(week))?;
        }

        info!(
            snapshots = panel.snapshot_count(),
            households = self.households.len(),
            rows = panel.len(),
            "Built household-week panel"
        );
        Ok(panel)
    }

    /// Build the rows of snapshot `week`.
    pub fn build_snapshot(&self, week: usize) -> PanelFragment {
        let cutoff_day = self.plan.cutoff_day(week);

        // All history up to the cutoff; lag windows narrow it further.
        let history: Vec<(&Transaction, u8)> = self
            .tagged
            .rows()
            .filter(|(t, _)| t.day <= cutoff_day)
            .collect();

        let mut rows: Vec<PanelRow> = self
            .households
            .iter()
            .map(|(key, num_baskets)| PanelRow {
                household_key: key.clone(),
                num_baskets,
                cutoff_day,
                lags: Vec::with_capacity(self.plan.lag_depth),
                attributes: None,
            })
            .collect();

        for lag in 0..self.plan.lag_depth {
            let window = WeekPlan::lag_window(cutoff_day, lag);
            let mut target_counts: HashMap<&HouseholdKey, u64> = HashMap::new();
            for (transaction, flag) in history.iter().filter(|(t, _)| window.contains(t.day)) {
                let count = target_counts.entry(&transaction.household_key).or_insert(0);
                *count = count.saturating_add(u64::from(*flag));
            }

            for row in &mut rows {
                let purchased = target_counts
                    .get(&row.household_key)
                    .map(|&count| u8::from(count >= 1));
                row.lags.push(purchased.unwrap_or(0));
            }
        }

        debug!(
            week,
            cutoff_day,
            history_rows = history.len(),
            "Built panel snapshot"
        );

        PanelFragment {
            cutoff_day,
            lag_depth: self.plan.lag_depth,
            rows,
        }
    }
}
