use bytes::Bytes;
use std::cmp::Ordering;

/// A value produced while evaluating a check expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Bytes),
}

impl Value {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Str(_) => "Str",
            Value::Bytes(_) => "Bytes",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_byte_slice(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    /// Equality with byte/string coercion, so `content() == "bar"` compares
    /// the payload bytes against the literal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => match (self.as_byte_slice(), other.as_byte_slice()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// Compare two values for ordering operators.
///
/// - Matching kinds compare directly.
/// - Byte and string content cross-compare lexicographically.
/// - Anything else is incomparable and yields `None` (the comparison
///   evaluates false).
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => match (left.as_byte_slice(), right.as_byte_slice()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_and_str_compare_equal() {
        let bytes = Value::Bytes(Bytes::from("bar"));
        let string = Value::Str("bar".to_string());
        assert!(bytes.loose_eq(&string));
        assert!(string.loose_eq(&bytes));
        assert_eq!(compare_values(&bytes, &string), Some(Ordering::Equal));
    }

    #[test]
    fn mismatched_kinds_are_not_equal() {
        assert!(!Value::Int(1).loose_eq(&Value::Str("1".to_string())));
        assert!(!Value::Bool(true).loose_eq(&Value::Int(1)));
    }

    #[test]
    fn incomparable_kinds_yield_none() {
        assert_eq!(compare_values(&Value::Int(1), &Value::Str("1".to_string())), None);
        assert_eq!(compare_values(&Value::Bool(true), &Value::Int(1)), None);
    }

    #[test]
    fn int_ordering() {
        assert_eq!(compare_values(&Value::Int(2), &Value::Int(3)), Some(Ordering::Less));
        assert_eq!(compare_values(&Value::Int(3), &Value::Int(3)), Some(Ordering::Equal));
    }
}
