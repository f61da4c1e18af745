//! # Field Types — The Matcher Engine
//!
//! A field type answers four questions about a field: does a value satisfy
//! it, what does it look like before decoding, what is its default, and how
//! does it print. [`FieldType`] is the open capability; [`Matcher`] is the
//! closed set of built-in variants plus a `Custom` slot for user types.
//!
//! ## Invariants
//!
//! - `matches` is a pure, total predicate. Incompatible inputs (including
//!   `Null`) return `false`, never an error.
//! - `default_value()` satisfies `matches` for every variant that has a
//!   meaningful default (`List`, `Nullable`). The engine does not re-check
//!   defaults.
//! - `decode` never fails for absent input: `Null` decodes to `Null` (or the
//!   caller substitutes the default before decoding).
//!
//! ## Signatures
//!
//! `describe()` composes recursively: `list(T)`, `list(T, empty: false)`,
//! `nullable(T)`, `enum(:a,:b)`, and for model-valued fields either the type
//! name or, for anonymous types, `schema(field:T,...)`.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use regex::Regex;

use crate::error::ModelError;
use crate::options::ConstructOptions;
use crate::primitive::Primitive;
use crate::schema::ModelType;
use crate::value::Value;

/// Capability set for a field's allowed values.
///
/// Implement this for domain-specific rules and wrap the implementation in
/// [`Matcher::Custom`] (or call [`Matcher::custom`]). Only `matches` and
/// `describe` are required; the default `default_value` is `Null` and the
/// default `decode` passes the raw value through.
pub trait FieldType: fmt::Debug + Send + Sync {
    /// Whether `value` satisfies this type.
    fn matches(&self, value: &Value) -> bool;

    /// The value a field takes when the snapshot omits it.
    fn default_value(&self) -> Value {
        Value::Null
    }

    /// Convert a raw snapshot value into its in-memory form.
    fn decode(&self, raw: Value, _options: &ConstructOptions) -> Result<Value, ModelError> {
        Ok(raw)
    }

    /// Canonical signature used in diagnostics.
    fn describe(&self) -> String;
}

// ─── Built-in Variants ───────────────────────────────────────────────

/// A closed, ordered set of allowed scalar values.
#[derive(Debug, Clone)]
pub struct EnumType {
    members: Vec<Value>,
}

impl EnumType {
    /// Build from the allowed members, in declaration order.
    pub fn new<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from symbol names, the common case for string-valued enums.
    pub fn symbols<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: names.into_iter().map(Value::symbol).collect(),
        }
    }

    /// The allowed members.
    pub fn members(&self) -> &[Value] {
        &self.members
    }
}

/// A homogeneous sequence of an element type.
#[derive(Debug, Clone)]
pub struct ListType {
    element: Box<Matcher>,
    allow_empty: bool,
}

impl ListType {
    /// A list of `element`, empty lists allowed.
    pub fn new(element: impl Into<Matcher>) -> Self {
        Self {
            element: Box::new(element.into()),
            allow_empty: true,
        }
    }

    /// Set whether an empty list satisfies this type.
    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// The element type.
    pub fn element(&self) -> &Matcher {
        &self.element
    }

    /// Whether an empty list satisfies this type.
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }
}

/// An inner type that additionally accepts `Null`.
#[derive(Debug, Clone)]
pub struct NullableType {
    inner: Box<Matcher>,
}

impl NullableType {
    /// Wrap `inner`.
    pub fn new(inner: impl Into<Matcher>) -> Self {
        Self {
            inner: Box::new(inner.into()),
        }
    }

    /// The wrapped type.
    pub fn inner(&self) -> &Matcher {
        &self.inner
    }
}

/// The tagged union of field types.
///
/// Built-in variants are matched exhaustively; `Custom` holds any external
/// [`FieldType`] implementation.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A scalar kind, pattern, or range.
    Primitive(Primitive),
    /// A closed set of allowed values.
    Enum(EnumType),
    /// A sequence of an element type.
    List(ListType),
    /// An inner type or `Null`.
    Nullable(NullableType),
    /// A nested model type (has-one).
    Model(Arc<ModelType>),
    /// A user-supplied field type.
    Custom(Arc<dyn FieldType>),
}

impl Matcher {
    /// Wrap a user-supplied field type.
    pub fn custom(field_type: impl FieldType + 'static) -> Self {
        Self::Custom(Arc::new(field_type))
    }

    /// Check `value` and report a `TypeMismatch` naming `field` on failure.
    pub fn check(&self, field: &str, value: &Value) -> Result<(), ModelError> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(ModelError::type_mismatch(field, self.describe(), value.inspect()))
        }
    }
}

impl FieldType for Matcher {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Primitive(primitive) => primitive.contains(value),
            Self::Enum(enum_type) => enum_type.members.iter().any(|m| m == value),
            Self::List(list) => match value {
                Value::List(items) => {
                    (list.allow_empty || !items.is_empty())
                        && items.iter().all(|item| list.element.matches(item))
                }
                _ => false,
            },
            Self::Nullable(nullable) => value.is_null() || nullable.inner.matches(value),
            Self::Model(model_type) => value
                .as_model()
                .is_some_and(|model| model_type.is_type_of(model)),
            Self::Custom(custom) => custom.matches(value),
        }
    }

    fn default_value(&self) -> Value {
        match self {
            Self::List(_) => Value::List(Vec::new()),
            Self::Custom(custom) => custom.default_value(),
            Self::Primitive(_) | Self::Enum(_) | Self::Nullable(_) | Self::Model(_) => Value::Null,
        }
    }

    fn decode(&self, raw: Value, options: &ConstructOptions) -> Result<Value, ModelError> {
        match self {
            Self::Primitive(primitive) => Ok(primitive.decode(raw)),
            Self::Enum(_) => Ok(match raw {
                Value::Str(s) => Value::symbol(s),
                other => other,
            }),
            Self::List(list) => match raw {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| list.element.decode(item, options))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                other => Ok(other),
            },
            Self::Nullable(nullable) => match raw {
                Value::Null => Ok(Value::Null),
                other => nullable.inner.decode(other, options),
            },
            Self::Model(model_type) => model_type.from_snapshot(raw, options),
            Self::Custom(custom) => custom.decode(raw, options),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Primitive(primitive) => primitive.to_string(),
            Self::Enum(enum_type) => {
                let members: Vec<String> = enum_type.members.iter().map(Value::inspect).collect();
                format!("enum({})", members.join(","))
            }
            Self::List(list) if list.allow_empty => format!("list({})", list.element.describe()),
            Self::List(list) => format!("list({}, empty: false)", list.element.describe()),
            Self::Nullable(nullable) => format!("nullable({})", nullable.inner.describe()),
            Self::Model(model_type) => model_type.describe(),
            Self::Custom(custom) => custom.describe(),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ─── Implicit Wrapping ───────────────────────────────────────────────

impl From<Primitive> for Matcher {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Self::Primitive(Primitive::Pattern(re))
    }
}

impl From<RangeInclusive<i64>> for Matcher {
    fn from(range: RangeInclusive<i64>) -> Self {
        Self::Primitive(Primitive::IntRange(range))
    }
}

impl From<RangeInclusive<f64>> for Matcher {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::Primitive(Primitive::FloatRange(range))
    }
}

impl From<EnumType> for Matcher {
    fn from(enum_type: EnumType) -> Self {
        Self::Enum(enum_type)
    }
}

impl From<ListType> for Matcher {
    fn from(list: ListType) -> Self {
        Self::List(list)
    }
}

impl From<NullableType> for Matcher {
    fn from(nullable: NullableType) -> Self {
        Self::Nullable(nullable)
    }
}

impl From<Arc<ModelType>> for Matcher {
    fn from(model_type: Arc<ModelType>) -> Self {
        Self::Model(model_type)
    }
}

impl From<&Arc<ModelType>> for Matcher {
    fn from(model_type: &Arc<ModelType>) -> Self {
        Self::Model(Arc::clone(model_type))
    }
}

impl From<Arc<dyn FieldType>> for Matcher {
    fn from(custom: Arc<dyn FieldType>) -> Self {
        Self::Custom(custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender() -> Matcher {
        EnumType::symbols(["male", "female"]).into()
    }

    #[test]
    fn test_list_matching() {
        let list = Matcher::from(ListType::new(Primitive::Integer));
        assert!(list.matches(&Value::List(vec![])));
        assert!(list.matches(&Value::List(vec![Value::Int(1), Value::Int(2)])));
        assert!(!list.matches(&Value::List(vec![Value::Int(1), Value::str("2")])));
        assert!(!list.matches(&Value::Int(1)));
        assert!(!list.matches(&Value::Null));
    }

    #[test]
    fn test_non_empty_list() {
        let list = Matcher::from(ListType::new(Primitive::Integer).allow_empty(false));
        assert!(!list.matches(&Value::List(vec![])));
        assert!(list.matches(&Value::List(vec![Value::Int(1)])));
        assert_eq!(list.describe(), "list(Integer, empty: false)");
    }

    #[test]
    fn test_nullable_matching() {
        let nullable = Matcher::from(NullableType::new(Primitive::String));
        assert!(nullable.matches(&Value::Null));
        assert!(nullable.matches(&Value::str("x")));
        assert!(!nullable.matches(&Value::Int(1)));
        assert_eq!(nullable.describe(), "nullable(String)");
    }

    #[test]
    fn test_enum_matching_is_exact() {
        let g = gender();
        assert!(g.matches(&Value::symbol("female")));
        assert!(!g.matches(&Value::str("female")));
        assert!(!g.matches(&Value::symbol("other")));
        assert_eq!(g.describe(), "enum(:male,:female)");
    }

    #[test]
    fn test_enum_decode() {
        let opts = ConstructOptions::default();
        let g = gender();
        assert_eq!(g.decode(Value::str("female"), &opts).unwrap(), Value::symbol("female"));
        assert_eq!(g.decode(Value::Int(3), &opts).unwrap(), Value::Int(3));

        let numeric = Matcher::from(EnumType::new([1i64, 2, 3]));
        assert_eq!(numeric.decode(Value::Int(2), &opts).unwrap(), Value::Int(2));
        assert!(numeric.matches(&Value::Int(2)));
        assert_eq!(numeric.describe(), "enum(1,2,3)");
    }

    #[test]
    fn test_list_decode_maps_elements() {
        let opts = ConstructOptions::default();
        let list = Matcher::from(ListType::new(Primitive::Symbol));
        let decoded = list
            .decode(Value::List(vec![Value::str("a"), Value::str("b")]), &opts)
            .unwrap();
        assert_eq!(decoded, Value::List(vec![Value::symbol("a"), Value::symbol("b")]));
        assert_eq!(list.decode(Value::Null, &opts).unwrap(), Value::Null);
    }

    #[test]
    fn test_nullable_decode() {
        let opts = ConstructOptions::default();
        let nullable = Matcher::from(NullableType::new(gender()));
        assert_eq!(nullable.decode(Value::Null, &opts).unwrap(), Value::Null);
        assert_eq!(
            nullable.decode(Value::str("male"), &opts).unwrap(),
            Value::symbol("male")
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Matcher::from(ListType::new(Primitive::Any)).default_value(), Value::List(vec![]));
        assert_eq!(Matcher::from(Primitive::String).default_value(), Value::Null);
        assert_eq!(gender().default_value(), Value::Null);
        assert_eq!(
            Matcher::from(NullableType::new(Primitive::String)).default_value(),
            Value::Null
        );
    }

    #[test]
    fn test_nested_signature() {
        let m = Matcher::from(ListType::new(NullableType::new(Primitive::from(1..=5))));
        assert_eq!(m.describe(), "list(nullable(1..5))");
    }

    #[test]
    fn test_check_reports_field() {
        let err = Matcher::from(Primitive::from(1..=100))
            .check("age", &Value::Int(9000))
            .unwrap_err();
        assert_eq!(err.to_string(), "expected age to be 1..100, got 9000");
    }

    #[derive(Debug)]
    struct Even;

    impl FieldType for Even {
        fn matches(&self, value: &Value) -> bool {
            value.as_i64().is_some_and(|n| n % 2 == 0)
        }

        fn default_value(&self) -> Value {
            Value::Int(0)
        }

        fn describe(&self) -> String {
            "even".into()
        }
    }

    #[test]
    fn test_custom_field_type() {
        let even = Matcher::custom(Even);
        assert!(even.matches(&Value::Int(4)));
        assert!(!even.matches(&Value::Int(3)));
        assert_eq!(even.default_value(), Value::Int(0));
        assert_eq!(even.describe(), "even");

        let opts = ConstructOptions::default();
        assert_eq!(even.decode(Value::Int(6), &opts).unwrap(), Value::Int(6));

        let list = Matcher::from(ListType::new(even));
        assert_eq!(list.describe(), "list(even)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::keyed;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-z]{0,8}".prop_map(Value::Str),
            "[a-z]{1,8}".prop_map(Value::symbol),
        ]
    }

    proptest! {
        /// A list matches iff every element matches the element type.
        #[test]
        fn list_matches_iff_all_elements_match(items in prop::collection::vec(scalar(), 0..8)) {
            let list = Matcher::from(ListType::new(Primitive::Integer));
            let expected = items.iter().all(|v| matches!(v, Value::Int(_)));
            prop_assert_eq!(list.matches(&Value::List(items)), expected);
        }

        /// Nullable delegates exactly to its inner type for non-null values.
        #[test]
        fn nullable_delegates_to_inner(value in scalar()) {
            let inner = Matcher::from(Primitive::String);
            let nullable = Matcher::from(NullableType::new(inner.clone()));
            if value.is_null() {
                prop_assert!(nullable.matches(&value));
            } else {
                prop_assert_eq!(nullable.matches(&value), inner.matches(&value));
            }
        }

        /// Enum membership is exact equality with a declared member.
        #[test]
        fn enum_matches_only_members(value in scalar()) {
            let members = vec![Value::symbol("a"), Value::Int(7), Value::Bool(true)];
            let enum_type = Matcher::from(EnumType::new(members.clone()));
            prop_assert_eq!(enum_type.matches(&value), members.contains(&value));
        }

        /// Decoding well-formed symbol lists yields values the list accepts.
        #[test]
        fn decoded_symbol_lists_match(names in prop::collection::vec("[a-z]{1,6}", 0..6)) {
            let list = Matcher::from(ListType::new(Primitive::Symbol));
            let raw = Value::List(names.into_iter().map(Value::Str).collect());
            let decoded = list.decode(raw, &ConstructOptions::default()).unwrap();
            prop_assert!(list.matches(&decoded));
        }

        /// Raw strings naming an enum member decode to the member symbol.
        #[test]
        fn decoded_enum_members_match(index in 0usize..3) {
            let names = ["red", "green", "blue"];
            let colour = Matcher::from(EnumType::symbols(names));
            let decoded = colour
                .decode(Value::str(names[index]), &ConstructOptions::default())
                .unwrap();
            prop_assert_eq!(&decoded, &Value::symbol(names[index]));
            prop_assert!(colour.matches(&decoded));
        }

        /// Nullable decoding accepts both null and well-formed inner snapshots.
        #[test]
        fn decoded_nullable_values_match(name in proptest::option::of("[a-z]{1,6}")) {
            let nullable = Matcher::from(NullableType::new(Primitive::Symbol));
            let raw = name.map_or(Value::Null, Value::Str);
            let decoded = nullable.decode(raw, &ConstructOptions::default()).unwrap();
            prop_assert!(nullable.matches(&decoded));
        }

        /// Keyed snapshots decode to instances of the field's model type,
        /// alone and as list elements.
        #[test]
        fn decoded_model_snapshots_match(
            name in "[a-z]{0,8}",
            tags in prop::collection::vec("[a-z]{1,4}", 0..4),
            count in 0usize..4,
        ) {
            let item = ModelType::schema(|b| {
                b.field("name", Primitive::String)?
                    .field("tags", ListType::new(Primitive::Symbol))
            })
            .unwrap();
            let snapshot = Value::Map(keyed([
                ("name", Value::Str(name)),
                ("tags", Value::List(tags.into_iter().map(Value::Str).collect())),
            ]));
            let opts = ConstructOptions::default();

            let single = Matcher::from(&item);
            let decoded = single.decode(snapshot.clone(), &opts).unwrap();
            prop_assert!(single.matches(&decoded));

            let many = Matcher::from(ListType::new(&item));
            let raw = Value::List(vec![snapshot; count]);
            let decoded = many.decode(raw, &opts).unwrap();
            prop_assert!(many.matches(&decoded));
        }
    }
}
