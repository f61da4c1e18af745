//! # Type Constructor Registry
//!
//! Maps short names (`list`, `nullable`, `enum`, plus user registrations)
//! to functions that build a [`Matcher`] from positional arguments. New
//! constructors are added with [`TypeRegistry::register`]; the registry's
//! own code never changes to accommodate them.
//!
//! For direct Rust call sites the free functions [`list`], [`nullable`],
//! and [`one_of`] build the same matchers without a lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::field::{EnumType, ListType, Matcher, NullableType};
use crate::primitive::Primitive;
use crate::value::Value;

/// A positional argument to a type constructor.
#[derive(Debug, Clone)]
pub enum TypeArg {
    /// A field type (the wrapped type of `list` / `nullable`).
    Type(Matcher),
    /// A literal value (an `enum` member, or a flag).
    Value(Value),
}

impl From<Matcher> for TypeArg {
    fn from(matcher: Matcher) -> Self {
        Self::Type(matcher)
    }
}

impl From<Primitive> for TypeArg {
    fn from(primitive: Primitive) -> Self {
        Self::Type(primitive.into())
    }
}

impl TypeArg {
    /// A literal argument.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }
}

/// A registered constructor.
pub type TypeConstructor = Arc<dyn Fn(Vec<TypeArg>) -> Result<Matcher, ModelError> + Send + Sync>;

/// Named type constructors.
pub struct TypeRegistry {
    constructors: HashMap<String, TypeConstructor>,
}

impl TypeRegistry {
    /// A registry with the built-in `list`, `nullable`, and `enum` constructors.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.insert("list", Arc::new(build_list));
        registry.insert("nullable", Arc::new(build_nullable));
        registry.insert("enum", Arc::new(build_enum));
        registry
    }

    /// A registry with no constructors.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a named constructor.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Declaration` if `name` is already registered.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> Result<(), ModelError>
    where
        F: Fn(Vec<TypeArg>) -> Result<Matcher, ModelError> + Send + Sync + 'static,
    {
        if self.constructors.contains_key(name) {
            return Err(ModelError::Declaration {
                owner: "TypeRegistry".into(),
                name: name.to_string(),
                reason: "a constructor with this name is already registered".into(),
            });
        }
        tracing::debug!(constructor = name, "registered type constructor");
        self.insert(name, Arc::new(constructor));
        Ok(())
    }

    /// Build a matcher with the constructor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownTypeConstructor` for an unregistered name,
    /// or whatever the constructor returns for bad arguments.
    pub fn build(&self, name: &str, args: Vec<TypeArg>) -> Result<Matcher, ModelError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ModelError::UnknownTypeConstructor(name.to_string()))?;
        constructor(args)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, name: &str, constructor: TypeConstructor) {
        self.constructors.insert(name.to_string(), constructor);
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("constructors", &self.names())
            .finish()
    }
}

// ─── Direct Constructors ─────────────────────────────────────────────

/// `list(T)`: a list of `element`, empty allowed.
pub fn list(element: impl Into<Matcher>) -> Matcher {
    ListType::new(element).into()
}

/// `list(T, empty: false)`: a non-empty list of `element`.
pub fn list_non_empty(element: impl Into<Matcher>) -> Matcher {
    ListType::new(element).allow_empty(false).into()
}

/// `nullable(T)`: `inner` or `Null`.
pub fn nullable(inner: impl Into<Matcher>) -> Matcher {
    NullableType::new(inner).into()
}

/// `enum(v1, v2, ...)`: exactly one of `members`.
pub fn one_of<I, V>(members: I) -> Matcher
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    EnumType::new(members).into()
}

// ─── Built-in Registrations ──────────────────────────────────────────

fn invalid(constructor: &str, reason: impl Into<String>) -> ModelError {
    ModelError::InvalidTypeArguments {
        constructor: constructor.to_string(),
        reason: reason.into(),
    }
}

fn build_list(args: Vec<TypeArg>) -> Result<Matcher, ModelError> {
    let mut args = args.into_iter();
    let element = match args.next() {
        Some(TypeArg::Type(element)) => element,
        Some(TypeArg::Value(v)) => return Err(invalid("list", format!("expected a type, got {v}"))),
        None => return Err(invalid("list", "missing element type")),
    };
    let allow_empty = match args.next() {
        None => true,
        Some(TypeArg::Value(Value::Bool(flag))) => flag,
        Some(_) => return Err(invalid("list", "second argument must be a boolean `empty` flag")),
    };
    if args.next().is_some() {
        return Err(invalid("list", "too many arguments"));
    }
    Ok(ListType::new(element).allow_empty(allow_empty).into())
}

fn build_nullable(args: Vec<TypeArg>) -> Result<Matcher, ModelError> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(TypeArg::Type(inner)), None) => Ok(nullable(inner)),
        _ => Err(invalid("nullable", "expected exactly one type argument")),
    }
}

fn build_enum(args: Vec<TypeArg>) -> Result<Matcher, ModelError> {
    if args.is_empty() {
        return Err(invalid("enum", "at least one member is required"));
    }
    let members = args
        .into_iter()
        .map(|arg| match arg {
            TypeArg::Value(v) => Ok(v),
            TypeArg::Type(t) => Err(invalid("enum", format!("members must be literals, got type {t}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(one_of(members))
}
