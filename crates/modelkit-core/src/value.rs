//! # Value Tree
//!
//! The decoded-snapshot representation consumed by model construction and
//! the storage representation held by model instances.
//!
//! ## Keys
//!
//! Map keys are either identifier-style ([`Key::Symbol`]) or raw strings
//! ([`Key::Str`]). Declared fields are only ever looked up by symbol key, so
//! a tree decoded with plain string keys presents every declared field as
//! absent. The JSON boundary decodes with identifier keys by default.
//!
//! ## Ordering and Equality
//!
//! [`Map`] preserves insertion order, which drives serialization order.
//! Equality is key/value-set equality and ignores order. A map may hold
//! `Key::Symbol("a")` and `Key::Str("a")` side by side, but such a map
//! cannot be serialized: both would become the object key `"a"`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::model::Model;

/// Insertion-ordered keyed container.
pub type Map = IndexMap<Key, Value>;

/// An interned identifier, distinct from a plain string value.
///
/// Displays as `:name`; serializes as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Intern `name` as a symbol.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The symbol's name without the leading colon.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

/// A map key: identifier-style or raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Identifier-style key, the form declared fields are stored under.
    Symbol(Symbol),
    /// Raw string key, as produced by a plain JSON decode.
    Str(String),
}

impl Key {
    /// An identifier-style key.
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// A raw string key.
    pub fn string(name: impl Into<String>) -> Self {
        Self::Str(name.into())
    }

    /// The key's text regardless of style.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Symbol(sym) => sym.as_str(),
            Self::Str(s) => s,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(sym) => f.write_str(sym.as_str()),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::symbol(name)
    }
}

impl From<Symbol> for Key {
    fn from(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }
}

/// A JSON-compatible value, extended with symbols and nested model instances.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent / null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Str(String),
    /// Interned identifier.
    Symbol(Symbol),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Ordered keyed tree (an undecoded snapshot object).
    Map(Map),
    /// A constructed model instance (has-one relationship).
    Model(Box<Model>),
}

impl Value {
    /// A string value.
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// A symbol value.
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string payload of a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The symbol payload of a `Symbol`.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// The payload of an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric payload of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The elements of a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries of a `Map`.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The instance held by a `Model`.
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Mutable access to the instance held by a `Model`.
    pub fn as_model_mut(&mut self) -> Option<&mut Model> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Diagnostic representation used in error messages.
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Symbol(sym) => write!(f, "{sym}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Model(model) => write!(f, "{model}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Symbol(sym) => serializer.serialize_str(sym.as_str()),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => serialize_entries(map, serializer),
            Self::Model(model) => model.serialize(serializer),
        }
    }
}

/// Serialize a keyed container in stored order, with every key as a string.
///
/// Fails when the same text is stored under both a symbol and a string key,
/// since the two would collapse into one duplicated object key.
pub(crate) fn serialize_entries<S: Serializer>(map: &Map, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seen = HashSet::with_capacity(map.len());
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        if !seen.insert(key.as_str()) {
            return Err(ser::Error::custom(format_args!(
                "key {:?} is stored both as a symbol and as a string",
                key.as_str()
            )));
        }
        out.serialize_entry(key.as_str(), value)?;
    }
    out.end()
}

/// Build a symbol-keyed [`Map`] from `(name, value)` pairs, in order.
pub fn keyed<I, K, V>(entries: I) -> Map
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (Key::symbol(k), v.into()))
        .collect()
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Self::Model(Box::new(model))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
