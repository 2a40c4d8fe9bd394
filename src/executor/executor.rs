//! Command executor for a region
//!
//! This module runs one parsed command against the table store and renders
//! the response line the region sends back.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::sql::parse_command;
use crate::storage::TableStore;

/// Successful outcome of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Row inserted
    Inserted,
    /// Table created
    TableCreated(String),
    /// Table dropped
    TableDropped(String),
    /// Rendered rows, in insertion order
    Rows(Vec<String>),
    /// The table holds no rows at all
    EmptyTable,
    /// The predicate matched no row
    EmptyResult,
    /// Rows removed by a predicate delete
    Deleted(usize),
    /// Table emptied by a delete without predicate
    TableCleared(String),
    /// Rows changed by an update
    Updated(usize),
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Inserted => write!(f, "OK"),
            QueryResult::TableCreated(name) => write!(f, "Table created: {}", name),
            QueryResult::TableDropped(name) => write!(f, "Table dropped: {}", name),
            QueryResult::Rows(rows) => write!(f, "{}", rows.join("\n")),
            QueryResult::EmptyTable => write!(f, "Empty table."),
            QueryResult::EmptyResult => write!(f, "Empty result."),
            QueryResult::Deleted(n) => write!(f, "Deleted rows: {}", n),
            QueryResult::TableCleared(name) => write!(f, "Table cleared: {}", name),
            QueryResult::Updated(n) => write!(f, "Updated rows: {}", n),
        }
    }
}

/// Execution engine for one region's tables
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    store: Arc<TableStore>,
}

impl ExecutionEngine {
    /// Create an engine over an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an existing store
    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    /// Underlying table store
    pub fn store(&self) -> &Arc<TableStore> {
        &self.store
    }

    /// Execute one command line and render the response text
    pub fn execute(&self, sql: &str) -> String {
        let command = parse_command(sql);
        debug!(?command, "executing command");

        match self.run(command) {
            Ok(result) => result.to_string(),
            Err(err) => err.to_string(),
        }
    }

    /// Execute a parsed command
    pub fn run(&self, command: Command) -> Result<QueryResult> {
        match command {
            Command::CreateTable(stmt) => self.execute_create_table(stmt),
            Command::DropTable(stmt) => self.execute_drop_table(stmt),
            Command::Insert(stmt) => self.execute_insert(stmt),
            Command::Select(stmt) => self.execute_select(stmt),
            Command::Delete(stmt) => self.execute_delete(stmt),
            Command::Update(stmt) => self.execute_update(stmt),
            Command::Invalid(kind) => Err(Error::InvalidSyntax(kind)),
            Command::Unsupported => Err(Error::Unsupported),
        }
    }

    fn execute_create_table(&self, stmt: CreateTableStatement) -> Result<QueryResult> {
        let columns = stmt
            .columns
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect();

        self.store
            .create_table(&stmt.table_name, columns, &stmt.primary_key)?;
        Ok(QueryResult::TableCreated(stmt.table_name))
    }

    fn execute_drop_table(&self, stmt: DropTableStatement) -> Result<QueryResult> {
        self.store.drop_table(&stmt.table_name)?;
        Ok(QueryResult::TableDropped(stmt.table_name))
    }

    fn execute_insert(&self, stmt: InsertStatement) -> Result<QueryResult> {
        self.store.with_table_mut(&stmt.table_name, |table| {
            table.insert(&stmt.columns, &stmt.values)
        })?;
        Ok(QueryResult::Inserted)
    }

    fn execute_select(&self, stmt: SelectStatement) -> Result<QueryResult> {
        self.store.with_table(&stmt.table_name, |table| {
            if table.is_empty() {
                return QueryResult::EmptyTable;
            }

            let rows: Vec<String> = table
                .select(stmt.predicate.as_ref())
                .into_iter()
                .map(|row| row.to_string())
                .collect();

            if rows.is_empty() {
                QueryResult::EmptyResult
            } else {
                QueryResult::Rows(rows)
            }
        })
    }

    fn execute_delete(&self, stmt: DeleteStatement) -> Result<QueryResult> {
        match stmt.predicate {
            Some(predicate) => {
                let count = self
                    .store
                    .with_table_mut(&stmt.table_name, |table| Ok(table.delete_where(&predicate)))?;
                Ok(QueryResult::Deleted(count))
            }
            None => {
                self.store.clear_table(&stmt.table_name)?;
                Ok(QueryResult::TableCleared(stmt.table_name))
            }
        }
    }

    fn execute_update(&self, stmt: UpdateStatement) -> Result<QueryResult> {
        let assignments: Vec<(String, String)> = stmt
            .assignments
            .into_iter()
            .map(|a| (a.column, a.value))
            .collect();

        let count = self.store.with_table_mut(&stmt.table_name, |table| {
            table.update_where(&assignments, &stmt.predicate)
        })?;
        Ok(QueryResult::Updated(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_users() -> ExecutionEngine {
        let engine = ExecutionEngine::new();
        assert_eq!(
            engine.execute("CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))"),
            "Table created: u"
        );
        engine
    }

    #[test]
    fn test_insert_and_select_by_key() {
        let engine = engine_with_users();

        assert_eq!(engine.execute("INSERT INTO u (id, val) VALUES (1, 'A')"), "OK");
        assert_eq!(
            engine.execute("INSERT INTO u (id, val) VALUES (1, 'B')"),
            "Duplicate primary key: 1"
        );
        assert_eq!(engine.execute("SELECT * FROM u WHERE id = 1"), "{id=1, val=A}");
    }

    #[test]
    fn test_create_errors() {
        let engine = engine_with_users();

        assert_eq!(
            engine.execute("CREATE TABLE u (id INT, PRIMARY KEY(id))"),
            "Table already exists: u"
        );
        assert_eq!(
            engine.execute("CREATE TABLE v (id INT, PRIMARY KEY(uid))"),
            "Primary key must be one of columns: uid"
        );
        assert_eq!(engine.execute("SELECT * FROM v"), "Table not found: v");
    }

    #[test]
    fn test_drop_and_recreate() {
        let engine = engine_with_users();
        engine.execute("INSERT INTO u (id, val) VALUES (1, 'A')");

        assert_eq!(engine.execute("DROP TABLE u"), "Table dropped: u");
        assert_eq!(engine.execute("DROP TABLE u"), "Table not found: u");
        assert_eq!(
            engine.execute("CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))"),
            "Table created: u"
        );
        assert_eq!(engine.execute("SELECT * FROM u"), "Empty table.");
    }

    #[test]
    fn test_insert_errors() {
        let engine = engine_with_users();

        assert_eq!(
            engine.execute("INSERT INTO u (id, val) VALUES (1)"),
            "Column/value count mismatch."
        );
        assert_eq!(
            engine.execute("INSERT INTO u (id, name) VALUES (1, 'x')"),
            "Column names mismatch. Expected: {id, val}"
        );
        assert_eq!(
            engine.execute("INSERT INTO u (id, val) VALUES ('x', 'y')"),
            "Type error: column `id` expects INT"
        );
        assert_eq!(
            engine.execute("INSERT INTO nope (id) VALUES (1)"),
            "Table not found: nope"
        );
        assert_eq!(engine.execute("SELECT * FROM u"), "Empty table.");
    }

    #[test]
    fn test_select_rows_and_empty_results() {
        let engine = engine_with_users();
        assert_eq!(engine.execute("SELECT * FROM u WHERE val = 'A'"), "Empty table.");

        engine.execute("INSERT INTO u (id, val) VALUES (2, 'B')");
        engine.execute("INSERT INTO u (val, id) VALUES ('A', 1)");

        assert_eq!(engine.execute("SELECT * FROM u"), "{id=2, val=B}\n{id=1, val=A}");
        assert_eq!(engine.execute("SELECT * FROM u WHERE val = 'Z'"), "Empty result.");
        assert_eq!(engine.execute("select * from u where VAL = 'A'"), "Empty result.");
    }

    #[test]
    fn test_delete_with_and_without_predicate() {
        let engine = engine_with_users();
        engine.execute("INSERT INTO u (id, val) VALUES (1, 'A')");
        engine.execute("INSERT INTO u (id, val) VALUES (2, 'A')");

        assert_eq!(engine.execute("DELETE FROM u WHERE val = 'Z'"), "Deleted rows: 0");
        assert_eq!(engine.execute("DELETE FROM u WHERE id = 1"), "Deleted rows: 1");

        assert_eq!(engine.execute("DELETE FROM u"), "Table cleared: u");
        assert_eq!(engine.execute("SELECT * FROM u"), "Empty table.");
        assert_eq!(engine.execute("INSERT INTO u (id, val) VALUES (2, 'again')"), "OK");
        assert_eq!(engine.execute("DELETE FROM ghost"), "Table not found: ghost");
    }

    #[test]
    fn test_update() {
        let engine = engine_with_users();
        engine.execute("INSERT INTO u (id, val) VALUES (5, 'Five')");
        engine.execute("INSERT INTO u (id, val) VALUES (6, 'Six')");

        assert_eq!(
            engine.execute("UPDATE u SET val = 'FIVE' WHERE id = 5"),
            "Updated rows: 1"
        );
        assert_eq!(engine.execute("SELECT * FROM u WHERE id = 5"), "{id=5, val=FIVE}");

        assert_eq!(
            engine.execute("UPDATE u SET email = 'x' WHERE id = 6"),
            "Update error (type or column mismatch)."
        );
        assert_eq!(
            engine.execute("UPDATE u SET id = 'abc' WHERE id = 6"),
            "Update error (type or column mismatch)."
        );
        assert_eq!(
            engine.execute("UPDATE u SET id = 5 WHERE id = 6"),
            "Duplicate primary key: 5"
        );
        assert_eq!(engine.execute("SELECT * FROM u WHERE id = 6"), "{id=6, val=Six}");
        assert_eq!(engine.execute("UPDATE u SET val = 'x' WHERE id = 99"), "Updated rows: 0");
    }

    #[test]
    fn test_syntax_and_unsupported() {
        let engine = ExecutionEngine::new();

        assert_eq!(engine.execute(""), "Unsupported SQL.");
        assert_eq!(engine.execute("SHOW TABLES"), "Unsupported SQL.");
        assert_eq!(engine.execute("CREATE TABLE t"), "Invalid CREATE syntax.");
        assert_eq!(engine.execute("DROP TABLE"), "Invalid DROP syntax.");
        assert_eq!(engine.execute("INSERT INTO t VALUES (1)"), "Invalid INSERT syntax.");
        assert_eq!(engine.execute("SELECT id FROM t"), "Invalid SELECT syntax.");
        assert_eq!(engine.execute("DELETE FROM t WHERE"), "Invalid DELETE syntax.");
        assert_eq!(engine.execute("UPDATE t SET a = 1"), "Invalid UPDATE syntax.");
    }

    #[test]
    fn test_shared_store() {
        let store = Arc::new(TableStore::new());
        let a = ExecutionEngine::with_store(store.clone());
        let b = ExecutionEngine::with_store(store);

        a.execute("CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))");
        assert_eq!(b.execute("SELECT * FROM u"), "Empty table.");
        assert!(a.store().table_exists("u"));
    }
}
