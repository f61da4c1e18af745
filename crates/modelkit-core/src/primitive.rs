//! # Primitive Shapes
//!
//! The raw types and shapes a field can be declared against directly:
//! scalar kinds, regular expressions, and numeric ranges. Declaring a field
//! with one of these wraps it as [`Matcher::Primitive`](crate::Matcher).

use std::fmt;
use std::ops::RangeInclusive;

use regex::Regex;

use crate::value::Value;

/// A primitive shape: scalar kind, string pattern, or numeric range.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Any string.
    String,
    /// Any integer.
    Integer,
    /// Any floating-point number. Integers do not match.
    Float,
    /// Any integer or floating-point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Any symbol. Raw strings decode to symbols.
    Symbol,
    /// Any value at all, including null.
    Any,
    /// Strings matching a regular expression.
    Pattern(Regex),
    /// Integers or floats inside an inclusive integer range.
    IntRange(RangeInclusive<i64>),
    /// Integers or floats inside an inclusive float range.
    FloatRange(RangeInclusive<f64>),
}

impl Primitive {
    /// Structural membership test. Total: incompatible values yield `false`.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::Str(_)),
            Self::Integer => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Symbol => matches!(value, Value::Symbol(_)),
            Self::Any => true,
            Self::Pattern(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Self::IntRange(range) => match value {
                Value::Int(n) => range.contains(n),
                Value::Float(x) => *range.start() as f64 <= *x && *x <= *range.end() as f64,
                _ => false,
            },
            Self::FloatRange(range) => value.as_f64().is_some_and(|x| range.contains(&x)),
        }
    }

    /// Convert a raw snapshot value into this shape's in-memory form.
    ///
    /// Only `Symbol` transforms anything: a raw string becomes a symbol.
    pub fn decode(&self, raw: Value) -> Value {
        match (self, raw) {
            (Self::Symbol, Value::Str(s)) => Value::symbol(s),
            (_, raw) => raw,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Integer => f.write_str("Integer"),
            Self::Float => f.write_str("Float"),
            Self::Number => f.write_str("Number"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Symbol => f.write_str("Symbol"),
            Self::Any => f.write_str("Any"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::IntRange(range) => write!(f, "{}..{}", range.start(), range.end()),
            Self::FloatRange(range) => write!(f, "{:?}..{:?}", range.start(), range.end()),
        }
    }
}

impl From<Regex> for Primitive {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<RangeInclusive<i64>> for Primitive {
    fn from(range: RangeInclusive<i64>) -> Self {
        Self::IntRange(range)
    }
}

impl From<RangeInclusive<f64>> for Primitive {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::FloatRange(range)
    }
}
