//! Command execution module
//!
//! This module contains the region-side executor.

pub mod executor;

pub use executor::{ExecutionEngine, QueryResult};
