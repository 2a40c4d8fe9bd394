//! Catalog module
//!
//! This module contains table schema definitions and data types.

pub mod schema;
pub mod types;

pub use schema::{Column, Schema};
pub use types::DataType;
