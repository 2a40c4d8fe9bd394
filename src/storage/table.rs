//! Table storage for RegionDB
//!
//! This module combines a schema with rows keyed by primary-key value.
//! Every mutating operation validates fully before touching any row.

use indexmap::IndexMap;

use super::row::Row;
use crate::catalog::Schema;
use crate::error::{Error, Result};
use crate::sql::Predicate;

/// An in-memory table
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name
    name: String,
    /// Table schema
    schema: Schema,
    /// Rows by primary-key value, in insertion order
    rows: IndexMap<String, Row>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: IndexMap::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by primary-key value
    pub fn get(&self, key: &str) -> Option<&Row> {
        self.rows.get(key)
    }

    /// Insert a row from parallel column and value lists
    pub fn insert(&mut self, columns: &[String], values: &[String]) -> Result<()> {
        if columns.len() != values.len() {
            return Err(Error::CountMismatch);
        }

        let schema = &self.schema;
        let names_match = columns.len() == schema.column_count()
            && schema.columns().iter().all(|c| columns.contains(&c.name));
        if !names_match {
            return Err(Error::ColumnNamesMismatch(
                schema.column_names().into_iter().map(String::from).collect(),
            ));
        }

        // Reorder into declared column order
        let mut fields = Vec::with_capacity(columns.len());
        for column in schema.columns() {
            let idx = columns
                .iter()
                .position(|c| *c == column.name)
                .ok_or_else(|| Error::ColumnNamesMismatch(Vec::new()))?;
            let value = &values[idx];

            if !column.data_type.accepts(value) {
                return Err(Error::IntExpected(column.name.clone()));
            }
            fields.push((column.name.clone(), value.clone()));
        }

        let key = fields[schema.primary_key().position].1.clone();
        if self.rows.contains_key(&key) {
            return Err(Error::DuplicatePrimaryKey(key));
        }

        self.rows.insert(key, Row::new(fields));
        Ok(())
    }

    /// Rows matching the predicate (all rows without one), insertion order
    pub fn select(&self, predicate: Option<&Predicate>) -> Vec<&Row> {
        match predicate {
            None => self.rows.values().collect(),
            Some(p) if p.column == self.schema.primary_key().name => {
                self.rows.get(&p.value).into_iter().collect()
            }
            Some(p) => self
                .rows
                .values()
                .filter(|row| row.matches(&p.column, &p.value))
                .collect(),
        }
    }

    /// Remove rows matching the predicate, returning how many were removed
    pub fn delete_where(&mut self, predicate: &Predicate) -> usize {
        if predicate.column == self.schema.primary_key().name {
            return usize::from(self.rows.shift_remove(&predicate.value).is_some());
        }

        let before = self.rows.len();
        self.rows
            .retain(|_, row| !row.matches(&predicate.column, &predicate.value));
        before - self.rows.len()
    }

    /// Apply assignments to every row matching the predicate.
    ///
    /// The whole update is rejected when any assignment names an undeclared
    /// column or gives an INT column a non-integer value. Assignments that
    /// rewrite the primary key re-key the affected rows in place and are
    /// rejected if two rows would end up sharing a key.
    pub fn update_where(
        &mut self,
        assignments: &[(String, String)],
        predicate: &Predicate,
    ) -> Result<usize> {
        for (column, value) in assignments {
            match self.schema.get_column(column) {
                Some(col) if col.data_type.accepts(value) => {}
                _ => return Err(Error::UpdateMismatch),
            }
        }

        let pk = self.schema.primary_key().name.as_str();
        let rewrites_key = assignments.iter().any(|(column, _)| column == pk);

        if !rewrites_key {
            let mut count = 0;
            for row in self.rows.values_mut() {
                if row.matches(&predicate.column, &predicate.value) {
                    for (column, value) in assignments {
                        row.set(column, value.as_str());
                    }
                    count += 1;
                }
            }
            return Ok(count);
        }

        // Build the re-keyed table aside so a collision leaves rows untouched
        let mut rekeyed = IndexMap::with_capacity(self.rows.len());
        let mut count = 0;
        for (key, row) in &self.rows {
            let mut row = row.clone();
            if row.matches(&predicate.column, &predicate.value) {
                for (column, value) in assignments {
                    row.set(column, value.as_str());
                }
                count += 1;
            }

            let new_key = row.get(pk).unwrap_or(key).to_string();
            if rekeyed.contains_key(&new_key) {
                return Err(Error::DuplicatePrimaryKey(new_key));
            }
            rekeyed.insert(new_key, row);
        }

        self.rows = rekeyed;
        Ok(count)
    }

    /// An empty table with the same name and schema
    pub fn emptied(&self) -> Table {
        Table::new(self.name.clone(), self.schema.clone())
    }
}
