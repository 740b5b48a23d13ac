//! Transaction-level types.
//!
//! A transaction row carries the household's demographic descriptors
//! redundantly; they are leveled per household later in the pipeline.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Source column names.
pub mod columns {
    pub const HOUSEHOLD_KEY: &str = "household_key";
    pub const BASKET_ID: &str = "BASKET_ID";
    pub const DAY: &str = "DAY";
    pub const COMMODITY_DESC: &str = "COMMODITY_DESC";
    pub const NET_SPEND_AMT: &str = "NET_SPEND_AMT";
    pub const LOY_CARD_DISC: &str = "LOY_CARD_DISC";

    pub const MARITAL_STATUS_CODE: &str = "MARITAL_STATUS_CODE";
    pub const AGE_DESC: &str = "AGE_DESC";
    pub const INCOME_DESC: &str = "INCOME_DESC";
    pub const HOMEOWNER_DESC: &str = "HOMEOWNER_DESC";
    pub const HH_COMP_DESC: &str = "HH_COMP_DESC";
    pub const HOUSEHOLD_SIZE_DESC: &str = "HOUSEHOLD_SIZE_DESC";
    pub const KID_CATEGORY_DESC: &str = "KID_CATEGORY_DESC";

    /// Columns every run needs.
    pub const CORE: [&str; 4] = [HOUSEHOLD_KEY, BASKET_ID, DAY, COMMODITY_DESC];

    /// Demographic descriptor columns, in output order.
    pub const DEMOGRAPHIC: [&str; 7] = [
        MARITAL_STATUS_CODE,
        AGE_DESC,
        INCOME_DESC,
        HOMEOWNER_DESC,
        HH_COMP_DESC,
        HOUSEHOLD_SIZE_DESC,
        KID_CATEGORY_DESC,
    ];

    /// Monetary columns used by attribute enrichment.
    pub const MONETARY: [&str; 2] = [NET_SPEND_AMT, LOY_CARD_DISC];
}

/// Identifier of a customer household.
///
/// Keys that both parse as integers order numerically; otherwise they
/// order lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseholdKey(String);

impl HouseholdKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Ord for HouseholdKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for HouseholdKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HouseholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HouseholdKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

macro_rules! household_key_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for HouseholdKey {
                fn from(key: $int) -> Self {
                    Self(key.to_string())
                }
            }
        )*
    };
}

household_key_from_int!(i32, i64, u32, u64);

/// Household demographic descriptors as they appear on one row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub marital_status: Option<String>,
    pub age: Option<String>,
    pub income: Option<String>,
    pub homeowner: Option<String>,
    pub household_composition: Option<String>,
    pub household_size: Option<String>,
    pub kid_category: Option<String>,
}

impl Demographics {
    /// Number of demographic fields.
    pub const FIELD_COUNT: usize = columns::DEMOGRAPHIC.len();

    /// Field by position, in `columns::DEMOGRAPHIC` order.
    pub fn field(&self, index: usize) -> Option<&str> {
        let value = match index {
            0 => &self.marital_status,
            1 => &self.age,
            2 => &self.income,
            3 => &self.homeowner,
            4 => &self.household_composition,
            5 => &self.household_size,
            6 => &self.kid_category,
            _ => return None,
        };
        value.as_deref()
    }

    /// Set a field by position, in `columns::DEMOGRAPHIC` order.
    pub fn set_field(&mut self, index: usize, value: Option<String>) {
        let slot = match index {
            0 => &mut self.marital_status,
            1 => &mut self.age,
            2 => &mut self.income,
            3 => &mut self.homeowner,
            4 => &mut self.household_composition,
            5 => &mut self.household_size,
            6 => &mut self.kid_category,
            _ => return,
        };
        *slot = value;
    }
}

/// One purchase event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub household_key: HouseholdKey,
    pub basket_id: Option<String>,
    /// Day index, day 1 being the earliest day of the dataset
    pub day: i64,
    pub commodity_desc: String,
    pub net_spend_amt: Option<f64>,
    pub loy_card_disc: Option<f64>,
    pub demographics: Demographics,
}

impl Transaction {
    /// Create a transaction with no monetary or demographic data.
    pub fn new(
        household_key: impl Into<HouseholdKey>,
        basket_id: impl Into<String>,
        day: i64,
        commodity_desc: impl Into<String>,
    ) -> Self {
        Self {
            household_key: household_key.into(),
            basket_id: Some(basket_id.into()),
            day,
            commodity_desc: commodity_desc.into(),
            net_spend_amt: None,
            loy_card_disc: None,
            demographics: Demographics::default(),
        }
    }

    pub fn with_spend(mut self, net_spend_amt: f64, loy_card_disc: f64) -> Self {
        self.net_spend_amt = Some(net_spend_amt);
        self.loy_card_disc = Some(loy_card_disc);
        self
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

/// The immutable input table.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    records: Vec<Transaction>,
    columns: BTreeSet<String>,
}

impl TransactionTable {
    /// Build a table that carries every known column.
    pub fn new(records: Vec<Transaction>) -> Self {
        let columns = columns::CORE
            .iter()
            .chain(columns::MONETARY.iter())
            .chain(columns::DEMOGRAPHIC.iter())
            .map(|c| c.to_string())
            .collect();
        Self { records, columns }
    }

    /// Build a table that only carries the named source columns.
    pub fn with_columns(records: Vec<Transaction>, columns: BTreeSet<String>) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_key_numeric_ordering() {
        let mut keys: Vec<HouseholdKey> = ["10", "9", "100", "2"]
            .iter()
            .map(|k| HouseholdKey::from(*k))
            .collect();
        keys.sort();

        let sorted: Vec<&str> = keys.iter().map(HouseholdKey::as_str).collect();
        assert_eq!(sorted, vec!["2", "9", "10", "100"]);
    }

    #[test]
    fn test_household_key_mixed_ordering() {
        let a = HouseholdKey::from("7");
        let b = HouseholdKey::from("hh-1");
        assert!(a < b);
        assert_ne!(HouseholdKey::from("07"), HouseholdKey::from("7"));
        assert_ne!(
            HouseholdKey::from("07").cmp(&HouseholdKey::from("7")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_demographic_field_access() {
        let mut demographics = Demographics::default();
        demographics.set_field(1, Some("45-54".to_string()));
        demographics.set_field(6, Some("None/Unknown".to_string()));

        assert_eq!(demographics.field(1), Some("45-54"));
        assert_eq!(demographics.age.as_deref(), Some("45-54"));
        assert_eq!(demographics.field(6), Some("None/Unknown"));
        assert_eq!(demographics.field(0), None);
        assert_eq!(demographics.field(7), None);
    }
}
