//! Primary-key cache
//!
//! Maps table names to their primary-key column, as learned from CREATE
//! TABLE statements passing through the master. Entries are overwritten by
//! a later CREATE of the same name and are kept across DROP TABLE.

use std::collections::HashMap;

/// Immutable `table -> primary-key column` map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryKeyCache {
    entries: HashMap<String, String>,
}

impl PrimaryKeyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this cache with `table` mapped to `column`
    pub fn with_entry(&self, table: &str, column: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(table.to_string(), column.to_string());
        Self { entries }
    }

    /// Primary-key column of `table`, if a CREATE for it was observed
    pub fn get(&self, table: &str) -> Option<&str> {
        self.entries.get(table).map(String::as_str)
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
