//! Row representation for RegionDB
//!
//! A row maps column names to string values in the table's declared
//! column order. Its `Display` form is part of the wire contract.

use indexmap::IndexMap;
use std::fmt;

/// A table row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    fields: IndexMap<String, String>,
}

impl Row {
    /// Create a row from `(column, value)` pairs, kept in the given order
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a field value by column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Overwrite an existing field; unknown columns are ignored
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        if let Some(slot) = self.fields.get_mut(column) {
            *slot = value.into();
        }
    }

    /// Check whether `column` holds exactly `value`
    pub fn matches(&self, column: &str, value: &str) -> bool {
        self.get(column) == Some(value)
    }

    /// Iterate `(column, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (column, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", column, value)?;
        }
        write!(f, "}}")
    }
}
