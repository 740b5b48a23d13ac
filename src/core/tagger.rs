//! Target-purchase tagging.

use crate::error::{PanelError, Result};
use crate::transactions::{columns, Transaction, TransactionTable};

/// A transaction table with a 0/1 target-purchase indicator per row.
#[derive(Debug, Clone)]
pub struct TaggedTable {
    table: TransactionTable,
    indicator: Vec<u8>,
    target: String,
}

impl TaggedTable {
    pub fn table(&self) -> &TransactionTable {
        &self.table
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Indicator value for each row, aligned with `table().records()`.
    pub fn indicator(&self) -> &[u8] {
        &self.indicator
    }

    /// Rows paired with their indicator.
    pub fn rows(&self) -> impl Iterator<Item = (&Transaction, u8)> + '_ {
        self.table
            .records()
            .iter()
            .zip(self.indicator.iter().copied())
    }

    /// Number of rows tagged as target purchases.
    pub fn target_count(&self) -> usize {
        self.indicator.iter().filter(|&&flag| flag == 1).count()
    }
}

/// Tag every row whose commodity description equals `target` exactly.
pub fn tag_target_purchases(table: TransactionTable, target: &str) -> Result<TaggedTable> {
    if !table.has_column(columns::COMMODITY_DESC) {
        return Err(PanelError::Schema(format!(
            "column {} is required to tag target purchases",
            columns::COMMODITY_DESC
        )));
    }

    let indicator = table
        .records()
        .iter()
        .map(|t| u8::from(t.commodity_desc == target))
        .collect();

    Ok(TaggedTable {
        table,
        indicator,
        target: target.to_string(),
    })
}
