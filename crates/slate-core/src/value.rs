//! Runtime-independent values.
//!
//! A [`Value`] is what a literal evaluates to, what the constant folder
//! predicts, and what instruction operands carry.

use std::fmt;

use ordered_float::OrderedFloat;

/// A constant value.
///
/// Floats are wrapped in [`OrderedFloat`] so values are `Eq + Hash` and can
/// be compared structurally in tests and used as table keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absence of a value (the default of `void` and `any`).
    Null,
    /// Signed integer.
    Int(i64),
    /// 64-bit float.
    Float(OrderedFloat<f64>),
    /// Boolean.
    Bool(bool),
    /// String data.
    Str(String),
    /// Structured list value.
    List(Vec<Value>),
}

impl Value {
    /// Create a float value.
    pub fn float(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }

    /// Create a string value.
    pub fn string(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// The static type name a value of this kind has.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "any",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::List(_) => "any[]",
        }
    }

    /// Get the integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::float(1.5).type_name(), "float");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::string("x").type_name(), "string");
        assert_eq!(Value::Null.type_name(), "any");
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(3).to_string(), "3");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::string("hi").to_string(), "\"hi\"");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn floats_are_hashable_and_comparable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Value::float(0.5));
        assert!(set.contains(&Value::float(0.5)));
        assert_ne!(Value::float(0.5), Value::float(0.25));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::string("a").as_str(), Some("a"));
        assert_eq!(Value::Null.as_int(), None);
    }
}
