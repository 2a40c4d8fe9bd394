//! Error types for RegionDB
//!
//! Semantic and syntax errors render as the exact response line a region
//! sends back to the master, so executors can answer with `err.to_string()`.

use thiserror::Error;

use crate::sql::StatementKind;

/// The main error type for RegionDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lexer error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Lexer error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Invalid {0} syntax.")]
    InvalidSyntax(StatementKind),

    #[error("Unsupported SQL.")]
    Unsupported,

    // ========== Catalog Errors ==========
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Primary key must be one of columns: {0}")]
    PrimaryKeyNotInColumns(String),

    // ========== Row Errors ==========
    #[error("Column/value count mismatch.")]
    CountMismatch,

    #[error("Column names mismatch. Expected: {{{}}}", .0.join(", "))]
    ColumnNamesMismatch(Vec<String>),

    #[error("Type error: column `{0}` expects INT")]
    IntExpected(String),

    #[error("Duplicate primary key: {0}")]
    DuplicatePrimaryKey(String),

    #[error("Update error (type or column mismatch).")]
    UpdateMismatch,

    // ========== Cluster Errors ==========
    #[error("invalid region address '{0}'")]
    InvalidAddress(String),

    #[error("registry error: {0}")]
    Registry(String),

    // ========== I/O Errors ==========
    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for RegionDB operations
pub type Result<T> = std::result::Result<T, Error>;
