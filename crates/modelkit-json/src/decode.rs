//! # JSON → Value Tree
//!
//! Decodes JSON text directly into a [`Value`] tree through a serde
//! `DeserializeSeed`, so object members keep document order without
//! enabling any ordering feature on `serde_json`.
//!
//! ## Key Style
//!
//! Model construction looks declared fields up by identifier key. The
//! default [`decode`] therefore produces [`Key::Symbol`] keys. The raw
//! variant ([`KeyStyle::String`]) keeps plain string keys; feeding such a
//! tree to a model makes every declared field look absent.
//!
//! ## Numbers
//!
//! Integers that fit `i64` decode to `Value::Int`; larger unsigned
//! integers and every number written with a fraction or exponent decode
//! to `Value::Float`.

use std::fmt;

use modelkit_core::{Key, Map, Value};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::error::JsonError;

/// How object keys are represented in the decoded tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// Identifier-style symbol keys. Required for model construction.
    #[default]
    Identifier,
    /// Plain string keys, as a generic JSON decoder would produce.
    String,
}

impl KeyStyle {
    fn key(self, name: String) -> Key {
        match self {
            Self::Identifier => Key::symbol(name),
            Self::String => Key::Str(name),
        }
    }
}

/// Decode `text` with identifier-style keys.
///
/// # Errors
///
/// Returns `JsonError::Malformed` if `text` is not a single valid JSON document.
pub fn decode(text: &str) -> Result<Value, JsonError> {
    decode_with(text, KeyStyle::Identifier)
}

/// Decode `text` with the given key style.
///
/// # Errors
///
/// Returns `JsonError::Malformed` if `text` is not a single valid JSON document.
pub fn decode_with(text: &str, keys: KeyStyle) -> Result<Value, JsonError> {
    let mut de = serde_json::Deserializer::from_str(text);
    let value = ValueSeed { keys }
        .deserialize(&mut de)
        .map_err(JsonError::Malformed)?;
    de.end().map_err(JsonError::Malformed)?;
    Ok(value)
}

#[derive(Clone, Copy)]
struct ValueSeed {
    keys: KeyStyle,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        self.deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Int(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(i64::try_from(n).map_or(Value::Float(n as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, x: f64) -> Result<Value, E> {
        Ok(Value::Float(x))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::Str(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::Str(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self)? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(name) = access.next_key::<String>()? {
            let value = access.next_value_seed(self)?;
            map.insert(self.keys.key(name), value);
        }
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::keyed;

    #[test]
    fn test_identifier_keys_by_default() {
        let value = decode(r#"{"name": "Anna", "age": 29}"#).unwrap();
        let expected = Value::Map(keyed([("name", Value::str("Anna")), ("age", Value::Int(29))]));
        assert_eq!(value, expected);
    }

    #[test]
    fn test_string_keys() {
        let value = decode_with(r#"{"name": "Anna"}"#, KeyStyle::String).unwrap();
        let map = value.as_map().unwrap();
        assert!(map.contains_key(&Key::string("name")));
        assert!(!map.contains_key(&Key::symbol("name")));
    }

    #[test]
    fn test_member_order_preserved() {
        let value = decode(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(Key::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(decode("29").unwrap(), Value::Int(29));
        assert_eq!(decode("-3").unwrap(), Value::Int(-3));
        assert_eq!(decode("29.0").unwrap(), Value::Float(29.0));
        assert_eq!(decode("1e2").unwrap(), Value::Float(100.0));
        assert_eq!(
            decode("18446744073709551615").unwrap(),
            Value::Float(18446744073709551615u64 as f64)
        );
    }

    #[test]
    fn test_nested() {
        let value = decode(r#"[{"tags": ["a", null, true]}]"#).unwrap();
        let expected = Value::List(vec![Value::Map(keyed([(
            "tags",
            Value::List(vec![Value::str("a"), Value::Null, Value::Bool(true)]),
        )]))]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(decode("{"), Err(JsonError::Malformed(_))));
        assert!(matches!(decode("{} {}"), Err(JsonError::Malformed(_))));
        assert!(matches!(decode(""), Err(JsonError::Malformed(_))));
    }
}
