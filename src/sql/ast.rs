//! Typed command representation
//!
//! One [`Command`] per request line. Values are kept as the strings the
//! client wrote (quotes stripped); typing happens against the table schema.

use std::fmt;

use crate::catalog::DataType;

/// Statement family, decided from the leading keywords alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Create,
    Drop,
    Insert,
    Select,
    Delete,
    Update,
}

impl StatementKind {
    /// Detect the statement family from the command prefix.
    ///
    /// Matching is a case-insensitive prefix test on the trimmed text
    /// (`CREATE TABLE`, `DROP TABLE`, `INSERT INTO`, `SELECT`,
    /// `DELETE FROM`, `UPDATE`), so a command that starts right but is
    /// otherwise malformed still reports the right kind of syntax error.
    pub fn detect(sql: &str) -> Option<StatementKind> {
        let up = sql.trim().to_ascii_uppercase();
        const PREFIXES: [(&str, StatementKind); 6] = [
            ("CREATE TABLE", StatementKind::Create),
            ("DROP TABLE", StatementKind::Drop),
            ("INSERT INTO", StatementKind::Insert),
            ("SELECT", StatementKind::Select),
            ("DELETE FROM", StatementKind::Delete),
            ("UPDATE", StatementKind::Update),
        ];

        PREFIXES
            .iter()
            .find(|(prefix, _)| up.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Create => "CREATE",
            StatementKind::Drop => "DROP",
            StatementKind::Insert => "INSERT",
            StatementKind::Select => "SELECT",
            StatementKind::Delete => "DELETE",
            StatementKind::Update => "UPDATE",
        };
        f.write_str(name)
    }
}

/// A parsed request line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT * statement
    Select(SelectStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// Recognized leading keyword, body does not match the grammar
    Invalid(StatementKind),
    /// Unrecognized leading keyword
    Unsupported,
}

impl Command {
    /// Target table name, when the command names one
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Command::CreateTable(s) => Some(&s.table_name),
            Command::DropTable(s) => Some(&s.table_name),
            Command::Insert(s) => Some(&s.table_name),
            Command::Select(s) => Some(&s.table_name),
            Command::Delete(s) => Some(&s.table_name),
            Command::Update(s) => Some(&s.table_name),
            Command::Invalid(_) | Command::Unsupported => None,
        }
    }
}

/// `col = val` equality predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub value: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions, in declared order
    pub columns: Vec<ColumnDef>,
    /// Column named in `PRIMARY KEY(...)`
    pub primary_key: String,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub table_name: String,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column list, as written
    pub columns: Vec<String>,
    /// Value list, as written (quotes stripped)
    pub values: Vec<String>,
}

impl InsertStatement {
    /// Value bound to `column` by position, if the column appears in the list
    pub fn value_for(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }
}

/// SELECT * statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table_name: String,
    pub predicate: Option<Predicate>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub predicate: Option<Predicate>,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value
    pub value: String,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// WHERE clause, mandatory in this grammar
    pub predicate: Predicate,
}
