//! # Model Schema
//!
//! A [`ModelType`] is a named or anonymous record type: an ordered mapping
//! from field name to [`Matcher`]. Types are built incrementally through
//! [`ModelTypeBuilder`] and are immutable once built; instances share them
//! through `Arc`.
//!
//! ## Accessor Collisions
//!
//! Every declared field owns two accessors, `name` and `name=`. A
//! declaration is rejected when either is already taken: by an earlier
//! field, by a built-in instance operation, or by a capability the caller
//! reserved with [`ModelTypeBuilder::reserve`]. The check runs once, at
//! declaration time.
//!
//! ## Signatures
//!
//! Named types describe themselves by name. Anonymous types describe
//! themselves structurally as `schema(field:T,...)`, recursively, so that
//! diagnostics on deeply nested inline structures stay readable.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ModelError;
use crate::field::{FieldType, Matcher};
use crate::model::Model;

/// Operations every model instance already has. Field names that collide
/// with these are rejected.
pub const BUILTIN_ACCESSORS: &[&str] = &[
    "contains_key",
    "describe",
    "error_messages",
    "fields",
    "freeze",
    "get",
    "get_key",
    "insert",
    "is_empty",
    "is_frozen",
    "is_valid",
    "iter",
    "keys",
    "len",
    "model_type",
    "prune_default_values",
    "remove",
    "set",
    "state",
    "to_value",
    "validate",
    "values",
];

/// Declaration options for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions {
    /// Whether an empty list satisfies a list-typed field. Forwarded to the
    /// field's [`ListType`](crate::ListType).
    pub empty: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self { empty: true }
    }
}

/// A declared field: its name and matcher.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    matcher: Matcher,
}

impl Field {
    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

/// A record type: optional name plus ordered field declarations.
#[derive(Debug)]
pub struct ModelType {
    name: Option<String>,
    fields: IndexMap<String, Field>,
    accessors: HashSet<String>,
}

impl ModelType {
    /// Start building a named type.
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(Some(name.into()))
    }

    /// Start building an anonymous type.
    pub fn anonymous_builder() -> ModelTypeBuilder {
        ModelTypeBuilder::new(None)
    }

    /// Build an anonymous inline type by running `declare` against a fresh
    /// builder. Used for nested composite fields.
    pub fn schema<F>(declare: F) -> Result<Arc<Self>, ModelError>
    where
        F: FnOnce(ModelTypeBuilder) -> Result<ModelTypeBuilder, ModelError>,
    {
        declare(Self::anonymous_builder()).map(ModelTypeBuilder::build)
    }

    /// The declared name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether `name` is an accessor on this type (field, built-in, or reserved).
    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains(name)
    }

    /// The type's name, or its recursive `schema(...)` signature if anonymous.
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let fields: Vec<String> = self
                    .fields
                    .values()
                    .map(|f| format!("{}:{}", f.name, f.matcher.describe()))
                    .collect();
                format!("schema({})", fields.join(","))
            }
        }
    }

    /// Whether `model` is an instance of this exact type.
    ///
    /// Identity is the shared `Arc`: two separately built types never match
    /// each other, even when their names are equal.
    pub fn is_type_of(&self, model: &Model) -> bool {
        std::ptr::eq(Arc::as_ptr(model.model_type()), self)
    }

    /// Schema position of a declared field.
    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Incremental builder for [`ModelType`].
#[derive(Debug)]
pub struct ModelTypeBuilder {
    ty: ModelType,
}

impl ModelTypeBuilder {
    fn new(name: Option<String>) -> Self {
        Self {
            ty: ModelType {
                name,
                fields: IndexMap::new(),
                accessors: BUILTIN_ACCESSORS.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Declare a field with default options.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Declaration` if `name` is not an identifier or
    /// if `name` / `name=` is already an accessor on the type.
    pub fn field(self, name: &str, matcher: impl Into<Matcher>) -> Result<Self, ModelError> {
        self.declare(name, matcher.into())
    }

    /// Declare a field with explicit [`FieldOptions`].
    ///
    /// # Errors
    ///
    /// As [`field`](Self::field); additionally rejects `empty: false` on a
    /// field whose matcher is not a list.
    pub fn field_with(
        self,
        name: &str,
        matcher: impl Into<Matcher>,
        options: FieldOptions,
    ) -> Result<Self, ModelError> {
        let matcher = match matcher.into() {
            Matcher::List(list) => Matcher::List(list.allow_empty(options.empty)),
            _ if !options.empty => {
                return Err(self.reject(name, "`empty: false` applies only to list fields"));
            }
            other => other,
        };
        self.declare(name, matcher)
    }

    /// Mark `name` as an existing capability of the type so that no field
    /// can shadow it. Use a trailing `=` to reserve only the write accessor.
    pub fn reserve(mut self, name: impl Into<String>) -> Self {
        self.ty.accessors.insert(name.into());
        self
    }

    /// Finalize the type.
    pub fn build(self) -> Arc<ModelType> {
        tracing::debug!(
            model = %self.ty.describe(),
            fields = self.ty.fields.len(),
            "model type finalized"
        );
        Arc::new(self.ty)
    }

    fn declare(mut self, name: &str, matcher: Matcher) -> Result<Self, ModelError> {
        if !is_identifier(name) {
            return Err(self.reject(name, "field names must be identifiers"));
        }
        let setter = format!("{name}=");
        if self.ty.accessors.contains(name) || self.ty.accessors.contains(&setter) {
            return Err(self.reject(name, "an accessor with this name is already defined"));
        }

        tracing::debug!(
            model = %self.owner(),
            field = name,
            signature = %matcher,
            "declared field"
        );

        self.ty.accessors.insert(name.to_string());
        self.ty.accessors.insert(setter);
        self.ty.fields.insert(
            name.to_string(),
            Field {
                name: name.to_string(),
                matcher,
            },
        );
        Ok(self)
    }

    fn owner(&self) -> String {
        self.ty.name.clone().unwrap_or_else(|| "schema".to_string())
    }

    fn reject(&self, name: &str, reason: &str) -> ModelError {
        ModelError::Declaration {
            owner: self.owner(),
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{EnumType, ListType, NullableType};
    use crate::primitive::Primitive;

    fn person() -> Arc<ModelType> {
        ModelType::builder("Person")
            .field("name", Primitive::String)
            .and_then(|b| b.field("gender", EnumType::symbols(["male", "female"])))
            .and_then(|b| b.field("age", 1..=100))
            .unwrap()
            .build()
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let ty = person();
        let names: Vec<&str> = ty.field_names().collect();
        assert_eq!(names, ["name", "gender", "age"]);
        assert_eq!(ty.field_count(), 3);
        assert_eq!(ty.field("age").unwrap().matcher().describe(), "1..100");
    }

    #[test]
    fn test_named_type_describes_by_name() {
        assert_eq!(person().describe(), "Person");
    }

    #[test]
    fn test_anonymous_signature_is_recursive() {
        let item = ModelType::schema(|b| {
            b.field("name", Primitive::String)?.field("price", Primitive::Float)
        })
        .unwrap();
        let order = ModelType::schema(|b| {
            b.field("items", ListType::new(&item))?
                .field("note", NullableType::new(Primitive::String))
        })
        .unwrap();
        assert_eq!(item.describe(), "schema(name:String,price:Float)");
        assert_eq!(
            order.describe(),
            "schema(items:list(schema(name:String,price:Float)),note:nullable(String))"
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ModelType::builder("Person")
            .field("name", Primitive::String)
            .and_then(|b| b.field("name", Primitive::Integer))
            .unwrap_err();
        assert!(matches!(err, ModelError::Declaration { ref name, .. } if name == "name"));
    }

    #[test]
    fn test_builtin_accessor_rejected() {
        let err = ModelType::builder("Person")
            .field("fields", Primitive::String)
            .unwrap_err();
        assert!(matches!(err, ModelError::Declaration { .. }));
    }

    #[test]
    fn test_reserved_capability_rejected() {
        let result = ModelType::builder("Person")
            .reserve("full_name")
            .field("full_name", Primitive::String);
        assert!(result.is_err());

        let setter_only = ModelType::builder("Person")
            .reserve("nickname=")
            .field("nickname", Primitive::String);
        assert!(setter_only.is_err());
    }

    #[test]
    fn test_non_identifier_rejected() {
        assert!(ModelType::builder("X").field("first name", Primitive::String).is_err());
        assert!(ModelType::builder("X").field("9lives", Primitive::String).is_err());
        assert!(ModelType::builder("X").field("", Primitive::String).is_err());
        assert!(ModelType::builder("X").field("_private", Primitive::String).is_ok());
    }

    #[test]
    fn test_empty_option_forwarded_to_list() {
        let ty = ModelType::builder("Post")
            .field_with("tags", ListType::new(Primitive::String), FieldOptions { empty: false })
            .unwrap()
            .build();
        assert_eq!(
            ty.field("tags").unwrap().matcher().describe(),
            "list(String, empty: false)"
        );
    }

    #[test]
    fn test_empty_option_on_scalar_rejected() {
        let result = ModelType::builder("Post").field_with(
            "title",
            Primitive::String,
            FieldOptions { empty: false },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_name_different_type_is_not_an_instance() {
        let city = ModelType::builder("Address")
            .field("city", Primitive::String)
            .unwrap()
            .build();
        let zip = ModelType::builder("Address")
            .field("zip", Primitive::Integer)
            .unwrap()
            .build();
        let zip_address = zip
            .construct(
                crate::value::keyed([("zip", 10001i64)]),
                &crate::options::ConstructOptions::default(),
            )
            .unwrap();

        assert!(zip.is_type_of(&zip_address));
        assert!(!city.is_type_of(&zip_address));
    }

    #[test]
    fn test_declared_accessors_registered() {
        let ty = person();
        assert!(ty.has_accessor("age"));
        assert!(ty.has_accessor("age="));
        assert!(ty.has_accessor("validate"));
        assert!(!ty.has_accessor("hobby"));
    }
}
