//! Delimited-text reader for the transaction table.

use super::types::{columns, Demographics, HouseholdKey, Transaction, TransactionTable};
use crate::error::{PanelError, Result};
use csv::StringRecord;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Field values treated as null.
const NULL_MARKERS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// Read a transaction table from a file.
///
/// Core columns are always required; monetary and demographic columns are
/// required when `require_attributes` is set.
pub fn read_transactions(path: &Path, require_attributes: bool) -> Result<TransactionTable> {
    let file = std::fs::File::open(path).map_err(|e| PanelError::io(path, e))?;
    let table = read_transactions_from(file, require_attributes)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        "Read transaction table"
    );
    Ok(table)
}

/// Read a transaction table from any reader.
pub fn read_transactions_from<R: Read>(
    reader: R,
    require_attributes: bool,
) -> Result<TransactionTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers);

    let mut required: Vec<&str> = columns::CORE.to_vec();
    if require_attributes {
        required.extend(columns::MONETARY);
        required.extend(columns::DEMOGRAPHIC);
    }
    let missing: Vec<&str> = required
        .into_iter()
        .filter(|c| !layout.contains(c))
        .collect();
    if !missing.is_empty() {
        return Err(PanelError::Schema(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        records.push(layout.parse_row(&record, index + 1)?);
    }
    debug!(rows = records.len(), columns = layout.present.len(), "Parsed transactions");

    Ok(TransactionTable::with_columns(records, layout.present))
}

/// Positions of the known columns within a header row.
struct ColumnLayout {
    positions: HashMap<&'static str, usize>,
    present: BTreeSet<String>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Self {
        let known = columns::CORE
            .iter()
            .chain(columns::MONETARY.iter())
            .chain(columns::DEMOGRAPHIC.iter());

        let mut positions = HashMap::new();
        let mut present = BTreeSet::new();
        for &name in known {
            if let Some(position) = headers.iter().position(|h| h == name) {
                positions.insert(name, position);
                present.insert(name.to_string());
            }
        }

        Self { positions, present }
    }

    fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Raw field value, `None` when the column is absent or the value is null.
    fn field<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        let position = *self.positions.get(name)?;
        record.get(position).filter(|v| !NULL_MARKERS.contains(v))
    }

    fn parse_row(&self, record: &StringRecord, row: usize) -> Result<Transaction> {
        let household_key = self
            .field(record, columns::HOUSEHOLD_KEY)
            .map(HouseholdKey::from)
            .ok_or_else(|| parse_error(row, columns::HOUSEHOLD_KEY, "household key is null"))?;

        let day = self
            .field(record, columns::DAY)
            .ok_or_else(|| parse_error(row, columns::DAY, "day index is null"))
            .and_then(|raw| parse_day(raw, row))?;

        let mut demographics = Demographics::default();
        for (index, name) in columns::DEMOGRAPHIC.iter().enumerate() {
            demographics.set_field(index, self.field(record, name).map(str::to_string));
        }

        Ok(Transaction {
            household_key,
            basket_id: self.field(record, columns::BASKET_ID).map(str::to_string),
            day,
            commodity_desc: self
                .field(record, columns::COMMODITY_DESC)
                .unwrap_or_default()
                .to_string(),
            net_spend_amt: self.amount(record, columns::NET_SPEND_AMT, row)?,
            loy_card_disc: self.amount(record, columns::LOY_CARD_DISC, row)?,
            demographics,
        })
    }

    fn amount(&self, record: &StringRecord, name: &str, row: usize) -> Result<Option<f64>> {
        self.field(record, name)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|e| parse_error(row, name, &format!("'{raw}' is not a number: {e}")))
            })
            .transpose()
    }
}

/// Parse a day index; integral floats such as `12.0` are accepted.
///
/// Floats outside the `i64` range are rejected rather than saturated.
fn parse_day(raw: &str, row: usize) -> Result<i64> {
    const LOWER: f64 = i64::MIN as f64;
    // 2^63, the first float past i64::MAX.
    const UPPER: f64 = -(i64::MIN as f64);

    let trimmed = raw.trim();
    if let Ok(day) = trimmed.parse::<i64>() {
        return Ok(day);
    }
    match trimmed.parse::<f64>() {
        Ok(day) if day.fract() == 0.0 && (LOWER..UPPER).contains(&day) => Ok(day as i64),
        _ => Err(parse_error(
            row,
            columns::DAY,
            &format!("'{raw}' is not an integer day index"),
        )),
    }
}

fn parse_error(row: usize, column: &str, message: &str) -> PanelError {
    PanelError::Parse {
        row,
        column: column.to_string(),
        message: message.to_string(),
    }
}
