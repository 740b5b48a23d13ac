//! Egg Lag Panel - household-week purchase panels from retail transactions.
//!
//! This library turns a transaction-level event log into a regular
//! household x week grid with backward-looking egg-purchase signals,
//! alongside household demographic and spending attributes, for
//! downstream predictive modeling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Egg Lag Panel                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐             │
//! │  │   Tagger    │──▶│  Windowing  │──▶│    Panel    │             │
//! │  │ (EGGS rows) │   │ (7-day bins)│   │ (lag feats) │             │
//! │  └─────────────┘   └─────────────┘   └─────────────┘             │
//! │         ▲                                    │                   │
//! │         │                                    ▼                   │
//! │  ┌─────────────┐                     ┌─────────────┐             │
//! │  │Transactions │────────────────────▶│ Attributes  │──▶ export   │
//! │  │   (read)    │                     │ (left join) │             │
//! │  └─────────────┘                     └─────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use egg_lag_panel::{pipeline, PanelConfig};
//! use std::path::Path;
//!
//! let config = PanelConfig::default();
//! let summary = pipeline::run(
//!     Path::new("transactions.csv"),
//!     Path::new("panel.csv"),
//!     &config,
//! )
//! .expect("panel run failed");
//! println!("{}", summary.summary());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod transactions;

// Re-export key types at crate root for convenience
pub use config::{ConfigError, DemographicOrder, PanelConfig, WeekLabelStyle};
pub use self::core::{
    enrich_panel, tag_target_purchases, HouseholdAttributes, Panel, PanelBuilder, PanelRow,
    TaggedTable, WeekPlan,
};
pub use error::{PanelError, Result};
pub use export::{write_panel, write_panel_to};
pub use report::{RunStats, RunSummary};
pub use transactions::{read_transactions, HouseholdKey, Transaction, TransactionTable};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
