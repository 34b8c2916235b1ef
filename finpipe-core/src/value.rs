//! Typed scalar values recovered from a transaction record.

use std::fmt;

/// A typed column value bound for the warehouse.
///
/// Dates travel as ISO `YYYY-MM-DD` strings in [`FieldValue::Text`]; the
/// destination column type for dates is a date-string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tokens() {
        assert_eq!(FieldValue::Null.to_string(), "NULL");
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::Bool(false).to_string(), "FALSE");
        assert_eq!(FieldValue::Text("Coffee".into()).to_string(), "Coffee");
    }
}
