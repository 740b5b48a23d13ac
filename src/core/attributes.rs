//! Household attribute enrichment.
//!
//! Demographic descriptors and basket-level spend aggregates are constant
//! per household. Each is reduced to one value per household and then
//! left-joined onto the panel by household key.

use crate::config::DemographicOrder;
use crate::core::panel::Panel;
use crate::core::tagger::TaggedTable;
use crate::error::Result;
use crate::transactions::{Demographics, HouseholdKey, Transaction, TransactionTable};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::info;

/// Output column for the average per-basket loyalty discount.
pub const AVG_LOYALTY_DISCOUNT_COLUMN: &str = "avgBasketLoyaltyDiscount";

/// Output column for the average per-basket non-target spend.
pub const AVG_SPEND_COLUMN: &str = "avgSpendAmtPerBasket";

/// Attributes joined onto each panel row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdAttributes {
    pub demographics: Demographics,
    /// Mean over baskets of the summed loyalty discount
    pub avg_basket_loyalty_discount: Option<f64>,
    /// Mean over baskets of the summed net spend, target rows excluded
    pub avg_spend_amt_per_basket: Option<f64>,
}

/// First non-null value of each demographic field per household.
///
/// Households without any non-null value for a field keep it null; a
/// household with no non-null field at all is left out.
pub fn level_demographics(
    table: &TransactionTable,
    order: DemographicOrder,
) -> Vec<(HouseholdKey, Demographics)> {
    let records = table.records();
    let mut positions: Vec<usize> = (0..records.len()).collect();
    if order == DemographicOrder::EarliestDay {
        positions.sort_by_key(|&i| records[i].day);
    }

    let mut leveled: BTreeMap<&HouseholdKey, Demographics> = BTreeMap::new();
    for transaction in positions.into_iter().map(|i| &records[i]) {
        for field in 0..Demographics::FIELD_COUNT {
            let Some(value) = transaction.demographics.field(field) else {
                continue;
            };
            let entry = leveled.entry(&transaction.household_key).or_default();
            if entry.field(field).is_none() {
                entry.set_field(field, Some(value.to_string()));
            }
        }
    }

    leveled
        .into_iter()
        .map(|(key, demographics)| (key.clone(), demographics))
        .collect()
}

/// Mean per household of per-basket sums of `amount`.
///
/// Rows without a basket id are skipped; null amounts count as zero within
/// their basket.
fn average_basket_sum<'t, I, F>(rows: I, amount: F) -> Vec<(HouseholdKey, f64)>
where
    I: IntoIterator<Item = &'t Transaction>,
    F: Fn(&Transaction) -> Option<f64>,
{
    let mut basket_sums: BTreeMap<(&HouseholdKey, &str), f64> = BTreeMap::new();
    for transaction in rows {
        let Some(basket) = transaction.basket_id.as_deref() else {
            continue;
        };
        *basket_sums
            .entry((&transaction.household_key, basket))
            .or_insert(0.0) += amount(transaction).unwrap_or(0.0);
    }

    let mut per_household: BTreeMap<&HouseholdKey, Vec<f64>> = BTreeMap::new();
    for ((key, _), sum) in basket_sums {
        per_household.entry(key).or_default().push(sum);
    }

    per_household
        .into_iter()
        .map(|(key, sums)| (key.clone(), sums.iter().mean()))
        .collect()
}

/// Average per-basket loyalty card discount per household.
pub fn average_basket_loyalty_discount(table: &TransactionTable) -> Vec<(HouseholdKey, f64)> {
    average_basket_sum(table.records(), |t| t.loy_card_disc)
}

/// Average per-basket net spend per household, target purchases excluded.
///
/// Households whose every row is a target purchase get no value.
pub fn average_non_target_spend(tagged: &TaggedTable) -> Vec<(HouseholdKey, f64)> {
    let non_target = tagged
        .rows()
        .filter(|&(_, flag)| flag == 0)
        .map(|(transaction, _)| transaction);
    average_basket_sum(non_target, |t| t.net_spend_amt)
}

/// Join demographic and spend attributes onto every panel row.
pub fn enrich_panel(panel: &mut Panel, tagged: &TaggedTable, order: DemographicOrder) -> Result<()> {
    let demographics = level_demographics(tagged.table(), order);
    panel.left_join("demographics", &demographics, |row, value| {
        row.attributes_mut().demographics = value.cloned().unwrap_or_default();
    })?;

    let loyalty = average_basket_loyalty_discount(tagged.table());
    panel.left_join(AVG_LOYALTY_DISCOUNT_COLUMN, &loyalty, |row, value| {
        row.attributes_mut().avg_basket_loyalty_discount = value.copied();
    })?;

    let spend = average_non_target_spend(tagged);
    panel.left_join(AVG_SPEND_COLUMN, &spend, |row, value| {
        row.attributes_mut().avg_spend_amt_per_basket = value.copied();
    })?;

    info!(
        households_with_demographics = demographics.len(),
        households_with_spend = spend.len(),
        rows = panel.len(),
        "Joined household attributes"
    );
    Ok(())
}
