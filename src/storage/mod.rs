//! Storage module
//!
//! This module contains the in-memory storage components:
//! - Rows with ordered fields
//! - Tables keyed by primary-key value
//! - The per-region table store

pub mod row;
pub mod store;
pub mod table;

pub use row::Row;
pub use store::TableStore;
pub use table::Table;
