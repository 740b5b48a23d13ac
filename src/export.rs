//! Panel output as delimited text.
//!
//! The file is written next to its destination and renamed into place, so
//! a failed run never leaves a partial panel behind.

use crate::core::attributes::{AVG_LOYALTY_DISCOUNT_COLUMN, AVG_SPEND_COLUMN};
use crate::core::panel::{lag_column_name, Panel, PanelRow};
use crate::error::{PanelError, Result};
use crate::transactions::{columns, Demographics};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header row for a panel.
pub fn panel_header(panel: &Panel) -> Vec<String> {
    let mut header = vec![
        columns::HOUSEHOLD_KEY.to_string(),
        "numBaskets".to_string(),
        panel.week_label().column_name().to_string(),
    ];
    header.extend((0..panel.lag_depth()).map(lag_column_name));

    if panel.is_enriched() {
        header.extend(columns::DEMOGRAPHIC.iter().map(|c| c.to_string()));
        header.push(AVG_LOYALTY_DISCOUNT_COLUMN.to_string());
        header.push(AVG_SPEND_COLUMN.to_string());
    }
    header
}

fn panel_record(panel: &Panel, row: &PanelRow) -> Vec<String> {
    let mut record = vec![
        row.household_key.to_string(),
        row.num_baskets.to_string(),
        panel.week_label().render(row.cutoff_day),
    ];
    record.extend(row.lags.iter().map(u8::to_string));

    if let Some(attributes) = &row.attributes {
        record.extend(
            (0..Demographics::FIELD_COUNT)
                .map(|i| attributes.demographics.field(i).unwrap_or_default().to_string()),
        );
        record.push(format_amount(attributes.avg_basket_loyalty_discount));
        record.push(format_amount(attributes.avg_spend_amt_per_basket));
    }
    record
}

/// Format an optional amount; integral values keep a trailing `.0`.
///
/// Non-integral values use the shortest round-trip `Display` text, which
/// never switches to exponent notation. Very small or very large
/// magnitudes therefore print in full positional form (`1e-5` becomes
/// `0.00001`), unlike dataframe writers that emit `1e-05`. Both parse
/// back to the same `f64`.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Write the panel to any writer.
pub fn write_panel_to<W: Write>(panel: &Panel, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(panel_header(panel))?;
    for row in panel.rows() {
        csv_writer.write_record(panel_record(panel, row))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the panel to `path`, replacing any existing file.
pub fn write_panel(panel: &Panel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PanelError::io(parent, e))?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    let staging = std::path::PathBuf::from(staging);

    let result = std::fs::File::create(&staging)
        .map_err(|e| PanelError::io(&staging, e))
        .and_then(|file| write_panel_to(panel, std::io::BufWriter::new(file)))
        .and_then(|()| std::fs::rename(&staging, path).map_err(|e| PanelError::io(path, e)));

    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result?;

    info!(path = %path.display(), rows = panel.len(), "Wrote panel");
    Ok(())
}
