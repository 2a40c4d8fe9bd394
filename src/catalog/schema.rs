//! Schema definitions for RegionDB
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Column position (0-indexed)
    pub position: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType, position: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            position,
        }
    }
}

/// Table schema - ordered columns plus the primary key column
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
    /// Index of the primary key column
    primary_key: usize,
}

impl Schema {
    /// Build a schema, rejecting a primary key that is not one of the columns.
    pub fn new(columns: Vec<(String, DataType)>, primary_key: &str) -> Result<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(position, (name, data_type))| Column::new(name, data_type, position))
            .collect();

        let name_to_index: HashMap<String, usize> = columns
            .iter()
            .map(|c| (c.name.clone(), c.position))
            .collect();

        let primary_key = *name_to_index
            .get(primary_key)
            .ok_or_else(|| Error::PrimaryKeyNotInColumns(primary_key.to_string()))?;

        Ok(Self {
            columns,
            name_to_index,
            primary_key,
        })
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get the primary key column
    pub fn primary_key(&self) -> &Column {
        &self.columns[self.primary_key]
    }

    /// Get column names, in declared order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(defs: &[(&str, DataType)]) -> Vec<(String, DataType)> {
        defs.iter().map(|(n, t)| (n.to_string(), *t)).collect()
    }

    #[test]
    fn test_schema_creation() {
        let schema = Schema::new(
            cols(&[("id", DataType::Int), ("name", DataType::Text)]),
            "id",
        )
        .unwrap();

        assert_eq!(schema.column_count(), 2);
        assert!(schema.has_column("id"));
        assert!(!schema.has_column("unknown"));
        assert_eq!(schema.primary_key().name, "id");
        assert_eq!(schema.get_column("name").unwrap().position, 1);
        assert_eq!(schema.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_primary_key_must_be_a_column() {
        let result = Schema::new(cols(&[("id", DataType::Int)]), "uid");
        assert!(matches!(result, Err(Error::PrimaryKeyNotInColumns(pk)) if pk == "uid"));
    }

    #[test]
    fn test_primary_key_need_not_be_first() {
        let schema = Schema::new(
            cols(&[("name", DataType::Text), ("code", DataType::Int)]),
            "code",
        )
        .unwrap();
        assert_eq!(schema.primary_key().position, 1);
    }
}
