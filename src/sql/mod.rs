//! SQL front end
//!
//! Tokenizer, keyword table and parser for the single-statement command
//! grammar shared by the master (classification) and regions (execution).

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Command, Predicate, StatementKind};
pub use lexer::Lexer;
pub use parser::{parse_command, Parser};
pub use token::{Keyword, Token};
