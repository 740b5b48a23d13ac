//! Core pipeline stages.
//!
//! This module contains:
//! - Target-purchase tagging of transaction rows
//! - Week window planning from the observed day range
//! - Household-week panel construction with lag features
//! - Household attribute enrichment

pub mod attributes;
pub mod panel;
pub mod tagger;
pub mod windowing;

// Re-export commonly used types
pub use attributes::{enrich_panel, HouseholdAttributes};
pub use panel::{lag_column_name, HouseholdIndex, Panel, PanelBuilder, PanelFragment, PanelRow};
pub use tagger::{tag_target_purchases, TaggedTable};
pub use windowing::{DayWindow, WeekPlan, DAYS_PER_WEEK};
