//! Data types for RegionDB
//!
//! Values are stored as strings; a column type only constrains which
//! strings are accepted.

use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer
    Int,
    /// Unlimited text
    Text,
}

impl DataType {
    /// Check whether a value is acceptable for this type
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            DataType::Int => value.parse::<i64>().is_ok(),
            DataType::Text => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "INT"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_accepts_i64_range() {
        assert!(DataType::Int.accepts("42"));
        assert!(DataType::Int.accepts("-7"));
        assert!(DataType::Int.accepts("9223372036854775807"));
        assert!(!DataType::Int.accepts("9223372036854775808"));
        assert!(!DataType::Int.accepts("abc"));
        assert!(!DataType::Int.accepts("3.5"));
        assert!(!DataType::Int.accepts(""));
    }

    #[test]
    fn test_text_accepts_anything() {
        assert!(DataType::Text.accepts(""));
        assert!(DataType::Text.accepts("hello world"));
    }
}
