//! # Snapshot Parsing and Dumping
//!
//! Turns a JSON document into model instances and back. The document root
//! is either one object (one instance) or an array of objects (a batch,
//! constructed element by element in document order).
//!
//! Decoding always uses identifier-style keys; see [`crate::decode`] for
//! what goes wrong with string keys.

use std::sync::Arc;

use modelkit_core::{ConstructOptions, Model, ModelType, Value};

use crate::decode::decode;
use crate::encode::{encode, encode_pretty};
use crate::error::JsonError;

/// The result of parsing one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The root was a single object.
    One(Model),
    /// The root was an array; one instance per element, in order.
    Many(Vec<Model>),
}

impl Parsed {
    /// Number of instances.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(models) => models.len(),
        }
    }

    /// Whether this is an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The instances, in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        match self {
            Self::One(model) => std::slice::from_ref(model).iter(),
            Self::Many(models) => models.iter(),
        }
    }

    /// The instances as a vector, in document order.
    pub fn into_vec(self) -> Vec<Model> {
        match self {
            Self::One(model) => vec![model],
            Self::Many(models) => models,
        }
    }
}

impl IntoIterator for Parsed {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

/// Parse `text` into one instance or a batch of instances of `model_type`.
///
/// # Errors
///
/// - `JsonError::Malformed` if `text` is not valid JSON.
/// - `JsonError::Model` if the root (or any array element) is not an
///   object, or construction rejects it. A batch fails as a whole on the
///   first element that fails.
pub fn parse(
    model_type: &Arc<ModelType>,
    text: &str,
    options: &ConstructOptions,
) -> Result<Parsed, JsonError> {
    match decode(text)? {
        Value::List(items) => {
            tracing::debug!(model = %model_type.describe(), count = items.len(), "parsing batch");
            let models = items
                .into_iter()
                .map(|item| model_type.construct_value(item, options))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Parsed::Many(models))
        }
        root => {
            tracing::debug!(model = %model_type.describe(), "parsing single document");
            Ok(Parsed::One(model_type.construct_value(root, options)?))
        }
    }
}

/// Parse `text`, which must hold a single object.
///
/// # Errors
///
/// As [`parse`], plus `JsonError::UnexpectedArray` for an array root.
pub fn parse_one(
    model_type: &Arc<ModelType>,
    text: &str,
    options: &ConstructOptions,
) -> Result<Model, JsonError> {
    match decode(text)? {
        Value::List(items) => Err(JsonError::UnexpectedArray(items.len())),
        root => Ok(model_type.construct_value(root, options)?),
    }
}

/// Compact JSON text for `model`: its container in stored order.
///
/// # Errors
///
/// Returns `JsonError::Encode` if serialization fails.
pub fn dump(model: &Model) -> Result<String, JsonError> {
    encode(model)
}

/// Indented JSON text for `model`.
///
/// # Errors
///
/// Returns `JsonError::Encode` if serialization fails.
pub fn dump_pretty(model: &Model) -> Result<String, JsonError> {
    encode_pretty(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::{EnumType, ModelError, Primitive};

    fn person() -> Arc<ModelType> {
        ModelType::builder("Person")
            .field("name", Primitive::String)
            .and_then(|b| b.field("gender", EnumType::symbols(["male", "female"])))
            .and_then(|b| b.field("age", 1..=100))
            .unwrap()
            .build()
    }

    const ANNA: &str = r#"{"name":"Anna","gender":"female","age":29}"#;

    #[test]
    fn test_parse_single() {
        let parsed = parse(&person(), ANNA, &ConstructOptions::default()).unwrap();
        assert_eq!(parsed.len(), 1);
        let Parsed::One(anna) = parsed else {
            panic!("expected a single instance");
        };
        assert_eq!(anna.get("gender").unwrap(), &Value::symbol("female"));
    }

    #[test]
    fn test_parse_batch_keeps_order() {
        let text = r#"[{"name":"A","gender":"male","age":1},{"name":"B","gender":"female","age":2}]"#;
        let parsed = parse(&person(), text, &ConstructOptions::default()).unwrap();
        let names: Vec<&str> = parsed
            .iter()
            .map(|m| m.get("name").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(names, ["A", "B"]);
        assert!(matches!(parsed, Parsed::Many(ref v) if v.len() == 2));
    }

    #[test]
    fn test_empty_batch() {
        let parsed = parse(&person(), "[]", &ConstructOptions::default()).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed, Parsed::Many(vec![]));
    }

    #[test]
    fn test_batch_fails_on_bad_element() {
        let text = r#"[{"name":"A","gender":"male","age":1}, 7]"#;
        let err = parse(&person(), text, &ConstructOptions::default()).unwrap_err();
        assert!(matches!(err.as_model_error(), Some(ModelError::NotAnObject { .. })));
    }

    #[test]
    fn test_scalar_root_rejected() {
        let err = parse(&person(), "\"Anna\"", &ConstructOptions::default()).unwrap_err();
        assert!(matches!(err, JsonError::Model(ModelError::NotAnObject { .. })));
    }

    #[test]
    fn test_parse_one_rejects_array() {
        let err = parse_one(&person(), "[{}, {}]", &ConstructOptions::lenient()).unwrap_err();
        assert!(matches!(err, JsonError::UnexpectedArray(2)));
    }

    #[test]
    fn test_malformed_is_not_a_model_error() {
        let err = parse(&person(), "{\"name\": ", &ConstructOptions::default()).unwrap_err();
        assert!(matches!(err, JsonError::Malformed(_)));
        assert!(err.as_model_error().is_none());
    }

    #[test]
    fn test_dump_round_trip() {
        let anna = parse_one(&person(), ANNA, &ConstructOptions::default()).unwrap();
        assert_eq!(dump(&anna).unwrap(), ANNA);
    }

    #[test]
    fn test_dump_pretty() {
        let anna = parse_one(&person(), ANNA, &ConstructOptions::default()).unwrap();
        let pretty = dump_pretty(&anna).unwrap();
        assert!(pretty.starts_with("{\n  \"name\": \"Anna\""));
    }
}
