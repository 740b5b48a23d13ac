//! Transaction input for the panel pipeline.
//!
//! This module provides the typed transaction table and the reader that
//! loads it from delimited text.

pub mod reader;
pub mod types;

// Re-export commonly used types
pub use reader::{read_transactions, read_transactions_from};
pub use types::{columns, Demographics, HouseholdKey, Transaction, TransactionTable};
