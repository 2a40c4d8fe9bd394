//! SQL Token definitions
//!
//! Keywords are not reserved: the lexer emits every bare word as
//! [`Token::Word`] and the parser asks [`Token::is_keyword`] where the
//! grammar expects one, so `text` or `key` remain usable as values.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Words & Literals ==========
    /// Bare word: keyword, identifier or unquoted value, original case kept
    Word(String),
    /// String literal (single-quoted, quotes stripped)
    StringLiteral(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ========== Special ==========
    /// End of input
    Eof,
}

/// Keywords of the command grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Drop,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Delete,
    Update,
    Set,
    Primary,
    Key,
    Int,
    Text,
}

impl Keyword {
    /// Try to parse a keyword from a word, ignoring case
    pub fn from_word(s: &str) -> Option<Keyword> {
        match s.to_ascii_uppercase().as_str() {
            // DDL
            "CREATE" => Some(Keyword::Create),
            "DROP" => Some(Keyword::Drop),
            "TABLE" => Some(Keyword::Table),
            "PRIMARY" => Some(Keyword::Primary),
            "KEY" => Some(Keyword::Key),

            // DML
            "INSERT" => Some(Keyword::Insert),
            "INTO" => Some(Keyword::Into),
            "VALUES" => Some(Keyword::Values),
            "SELECT" => Some(Keyword::Select),
            "FROM" => Some(Keyword::From),
            "WHERE" => Some(Keyword::Where),
            "DELETE" => Some(Keyword::Delete),
            "UPDATE" => Some(Keyword::Update),
            "SET" => Some(Keyword::Set),

            // Data Types
            "INT" => Some(Keyword::Int),
            "TEXT" => Some(Keyword::Text),

            _ => None,
        }
    }

    /// Canonical upper-case spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Drop => "DROP",
            Keyword::Table => "TABLE",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Delete => "DELETE",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::Int => "INT",
            Keyword::Text => "TEXT",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    /// Check if this token is the given keyword
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        match self {
            Token::Word(w) => Keyword::from_word(w) == Some(keyword),
            _ => false,
        }
    }

    /// The keyword this token spells, if any
    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Token::Word(w) => Keyword::from_word(w),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{}", w),
            Token::StringLiteral(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Eq => write!(f, "="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(Keyword::from_word("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("SeLeCt"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("users"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(Token::Word("where".to_string()).is_keyword(Keyword::Where));
        assert!(!Token::Word("wherever".to_string()).is_keyword(Keyword::Where));
        assert!(!Token::StringLiteral("WHERE".to_string()).is_keyword(Keyword::Where));
        assert!(!Token::Asterisk.is_keyword(Keyword::Select));
    }

    #[test]
    fn test_display_round_trips_quotes() {
        assert_eq!(Token::StringLiteral("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(Keyword::Primary.to_string(), "PRIMARY");
    }
}
