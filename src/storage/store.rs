//! Table store for a region
//!
//! Holds every table of one region behind a single reader/writer lock, so
//! each statement observes and leaves the store in a consistent state.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::table::Table;
use crate::catalog::{DataType, Schema};
use crate::error::{Error, Result};

/// All tables of one region
#[derive(Debug, Default)]
pub struct TableStore {
    /// Tables by name
    tables: RwLock<HashMap<String, Table>>,
}

impl TableStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Table>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Table>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new table; the primary key must be one of the columns
    pub fn create_table(
        &self,
        name: &str,
        columns: Vec<(String, DataType)>,
        primary_key: &str,
    ) -> Result<()> {
        let mut tables = self.write();

        if tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }

        let schema = Schema::new(columns, primary_key)?;
        tables.insert(name.to_string(), Table::new(name, schema));
        Ok(())
    }

    /// Drop a table
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let mut tables = self.write();

        if tables.remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Replace a table with an empty one of the same schema
    pub fn clear_table(&self, name: &str) -> Result<()> {
        let mut tables = self.write();

        let table = tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        *table = table.emptied();
        Ok(())
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Run a read-only operation against one table
    pub fn with_table<T>(&self, name: &str, f: impl FnOnce(&Table) -> T) -> Result<T> {
        let tables = self.read();
        let table = tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        Ok(f(table))
    }

    /// Run a mutating operation against one table
    pub fn with_table_mut<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> Result<T>,
    ) -> Result<T> {
        let mut tables = self.write();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        f(table)
    }

    /// List table names
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<(String, DataType)> {
        vec![
            ("id".to_string(), DataType::Int),
            ("val".to_string(), DataType::Text),
        ]
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_and_drop_table() {
        let store = TableStore::new();

        store.create_table("u", columns(), "id").unwrap();
        assert!(store.table_exists("u"));
        assert!(matches!(
            store.create_table("u", columns(), "id"),
            Err(Error::TableAlreadyExists(ref n)) if n == "u"
        ));

        store.drop_table("u").unwrap();
        assert!(!store.table_exists("u"));
        assert!(matches!(
            store.drop_table("u"),
            Err(Error::TableNotFound(ref n)) if n == "u"
        ));
    }

    #[test]
    fn test_create_rejects_unknown_primary_key() {
        let store = TableStore::new();
        assert!(matches!(
            store.create_table("u", columns(), "uid"),
            Err(Error::PrimaryKeyNotInColumns(ref pk)) if pk == "uid"
        ));
        assert!(!store.table_exists("u"));

        // An existing name wins over a bad primary key
        store.create_table("u", columns(), "id").unwrap();
        assert!(matches!(
            store.create_table("u", columns(), "uid"),
            Err(Error::TableAlreadyExists(_))
        ));
    }

    #[test]
    fn test_recreated_table_is_fresh() {
        let store = TableStore::new();
        store.create_table("u", columns(), "id").unwrap();
        store
            .with_table_mut("u", |t| t.insert(&strings(&["id", "val"]), &strings(&["1", "A"])))
            .unwrap();

        store.drop_table("u").unwrap();
        store.create_table("u", columns(), "id").unwrap();

        assert!(store.with_table("u", |t| t.is_empty()).unwrap());
    }

    #[test]
    fn test_clear_table_keeps_schema() {
        let store = TableStore::new();
        store.create_table("u", columns(), "id").unwrap();
        store
            .with_table_mut("u", |t| t.insert(&strings(&["id", "val"]), &strings(&["1", "A"])))
            .unwrap();

        store.clear_table("u").unwrap();
        assert!(store.with_table("u", |t| t.is_empty()).unwrap());

        // The old key is free again
        store
            .with_table_mut("u", |t| t.insert(&strings(&["id", "val"]), &strings(&["1", "B"])))
            .unwrap();
        assert_eq!(store.with_table("u", |t| t.len()).unwrap(), 1);

        assert!(matches!(store.clear_table("nope"), Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_missing_table_access() {
        let store = TableStore::new();
        assert!(matches!(
            store.with_table("ghost", |t| t.len()),
            Err(Error::TableNotFound(ref n)) if n == "ghost"
        ));
    }

    #[test]
    fn test_list_tables_sorted() {
        let store = TableStore::new();
        store.create_table("b", columns(), "id").unwrap();
        store.create_table("a", columns(), "id").unwrap();
        assert_eq!(store.list_tables(), vec!["a", "b"]);
    }
}
