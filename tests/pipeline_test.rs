//! Integration tests for the transaction-to-panel pipeline

use egg_lag_panel::{pipeline, PanelConfig, PanelError, WeekLabelStyle};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

const HEADER: &str = "household_key,BASKET_ID,DAY,PRODUCT_ID,COMMODITY_DESC,NET_SPEND_AMT,\
LOY_CARD_DISC,MARITAL_STATUS_CODE,AGE_DESC,INCOME_DESC,HOMEOWNER_DESC,HH_COMP_DESC,\
HOUSEHOLD_SIZE_DESC,KID_CATEGORY_DESC";

/// Two households over four weeks; household 3 only buys eggs.
fn sample_rows() -> Vec<&'static str> {
    vec![
        "1,100,1,9,EGGS,2.00,-0.50,A,45-54,50-74K,Homeowner,2 Adults No Kids,2,None/Unknown",
        "1,100,1,9,MILK,3.00,0.00,,,,,,,",
        "2,200,3,9,BREAD,1.50,-0.25,,,,,,,",
        "2,201,10,9,EGGS,2.50,-1.00,B,25-34,25-34K,Renter,Single Female,1,None/Unknown",
        "1,101,16,9,EGGS,2.00,0.00,U,45-54,75-99K,Homeowner,2 Adults No Kids,2,None/Unknown",
        "3,300,20,9,EGGS,4.00,-0.75,,,,,,,",
        "2,202,25,9,MILK,3.00,0.00,,,,,,,",
        "1,102,28,9,EGGS,2.00,-1.00,,,,,,,",
    ]
}

fn write_input(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("transactions.csv");
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("Failed to write input");
    path
}

fn config(lag_depth: usize) -> PanelConfig {
    PanelConfig {
        lag_depth,
        ..PanelConfig::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open output");
    let mut rows = vec![reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect()];
    for record in reader.records() {
        rows.push(record.expect("Bad record").iter().map(str::to_string).collect());
    }
    rows
}

#[test]
fn test_full_pipeline_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &sample_rows());
    let output = dir.path().join("processed").join("panel.csv");

    let summary = pipeline::run(&input, &output, &config(2)).expect("Pipeline failed");

    // Days 1..28: four whole weeks, two lags -> three snapshots (28, 21, 14).
    assert_eq!(summary.stats.snapshots, 3);
    assert_eq!(summary.stats.households, 3);
    assert_eq!(summary.stats.panel_rows, 9);
    assert_eq!(summary.stats.target_purchases, 5);

    let rows = read_rows(&output);
    assert_eq!(
        rows[0][..5].to_vec(),
        vec!["household_key", "numBaskets", "weekOf", "eggPurchase_week0", "eggPurchase_week1"]
    );
    assert_eq!(rows[0].len(), 5 + 7 + 2);
    assert_eq!(rows.len(), 10);

    let lags: Vec<Vec<&str>> = rows[1..]
        .iter()
        .map(|r| r[..5].iter().map(String::as_str).collect())
        .collect();
    assert_eq!(
        lags,
        vec![
            vec!["1", "4", "28", "1", "1"],
            vec!["2", "3", "28", "0", "0"],
            vec!["3", "1", "28", "0", "1"],
            vec!["1", "4", "21", "1", "0"],
            vec!["2", "3", "21", "0", "1"],
            vec!["3", "1", "21", "1", "0"],
            vec!["1", "4", "14", "0", "1"],
            vec!["2", "3", "14", "1", "0"],
            vec!["3", "1", "14", "0", "0"],
        ]
    );
}

#[test]
fn test_household_attributes_are_constant_per_household() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &sample_rows());
    let output = dir.path().join("panel.csv");

    pipeline::run(&input, &output, &config(2)).expect("Pipeline failed");
    let rows = read_rows(&output);
    let header = &rows[0];
    let column = |name: &str| header.iter().position(|h| h == name).unwrap();

    for row in &rows[1..] {
        match row[0].as_str() {
            "1" => {
                // Earliest row with a value is day 1.
                assert_eq!(row[column("MARITAL_STATUS_CODE")], "A");
                assert_eq!(row[column("INCOME_DESC")], "50-74K");
                // Baskets 100, 101, 102: -0.50, 0.00, -1.00
                assert_eq!(row[column("avgBasketLoyaltyDiscount")], "-0.5");
                // Only basket 100 has non-egg spend.
                assert_eq!(row[column("avgSpendAmtPerBasket")], "3.0");
            }
            "2" => {
                assert_eq!(row[column("AGE_DESC")], "25-34");
                assert_eq!(row[column("avgSpendAmtPerBasket")], "2.25");
            }
            "3" => {
                assert_eq!(row[column("AGE_DESC")], "");
                assert_eq!(row[column("avgBasketLoyaltyDiscount")], "-0.75");
                assert_eq!(row[column("avgSpendAmtPerBasket")], "");
            }
            other => panic!("unexpected household {other}"),
        }
    }
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &sample_rows());
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    pipeline::run(&input, &first, &config(2)).unwrap();
    pipeline::run(&input, &second, &config(2)).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn test_descriptive_labels_without_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &sample_rows());
    let output = dir.path().join("panel.csv");
    let config = PanelConfig {
        lag_depth: 4,
        week_label: WeekLabelStyle::Descriptive,
        enrich_attributes: false,
        ..PanelConfig::default()
    };

    pipeline::run(&input, &output, &config).unwrap();
    let rows = read_rows(&output);

    assert_eq!(
        rows,
        vec![
            vec![
                "household_key",
                "numBaskets",
                "week",
                "eggPurchase_week0",
                "eggPurchase_week1",
                "eggPurchase_week2",
                "eggPurchase_week3",
            ],
            vec!["1", "4", "Week of 28", "1", "1", "0", "1"],
            vec!["2", "3", "Week of 28", "0", "0", "1", "0"],
            vec!["3", "1", "Week of 28", "0", "1", "0", "0"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(str::to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>()
    );
}

#[test]
fn test_too_many_lags_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &sample_rows());
    let output = dir.path().join("panel.csv");

    let err = pipeline::run(&input, &output, &config(5)).unwrap_err();

    assert!(matches!(err, PanelError::Configuration(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transactions.csv");
    std::fs::write(&input, "household_key,BASKET_ID,COMMODITY_DESC\n1,100,EGGS\n").unwrap();
    let output = dir.path().join("panel.csv");

    let err = pipeline::run(&input, &output, &config(1)).unwrap_err();

    match err {
        PanelError::Schema(msg) => assert!(msg.contains("DAY")),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(!output.exists());
}
