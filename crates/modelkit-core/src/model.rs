//! # Model Instances
//!
//! A [`Model`] is an ordered keyed container bound to one [`ModelType`].
//! The container is a superset of the declared fields: unknown keys from
//! the input may be retained alongside them.
//!
//! ## Lifecycle
//!
//! ```text
//! Building ──▶ Validated ◀──▶ Invalid
//!                  │             │
//!                  └──▶ Frozen ◀─┘
//! ```
//!
//! `Validated` / `Invalid` track the outcome of the latest full field walk
//! and are refreshed after every successful mutation; lenient construction
//! can leave `Building` straight for `Invalid`. `Frozen` is terminal:
//! every mutating operation fails with `FrozenInstance` and leaves the
//! stored values untouched.
//!
//! ## Validation
//!
//! Three entry points share one field walk and therefore always agree:
//!
//! - [`Model::validate`]: fails with the first mismatch, in schema order.
//! - [`Model::is_valid`]: `false` on the first mismatch.
//! - [`Model::error_messages`]: every mismatch, for form-style reporting.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::ModelError;
use crate::field::FieldType;
use crate::options::ConstructOptions;
use crate::schema::{Field, ModelType};
use crate::value::{serialize_entries, Key, Map, Value};

static NULL: Value = Value::Null;

/// Lifecycle state of a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelState {
    /// Fields are still being decoded.
    Building,
    /// Every declared field matches its type.
    Validated,
    /// At least one declared field does not match its type.
    Invalid,
    /// Immutable. Terminal.
    Frozen,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => f.write_str("BUILDING"),
            Self::Validated => f.write_str("VALIDATED"),
            Self::Invalid => f.write_str("INVALID"),
            Self::Frozen => f.write_str("FROZEN"),
        }
    }
}

/// A schema-bound, optionally frozen keyed container of field values.
#[derive(Debug, Clone)]
pub struct Model {
    model_type: Arc<ModelType>,
    data: Map,
    state: ModelState,
}

// ─── Construction ────────────────────────────────────────────────────

impl ModelType {
    /// Build an instance from a keyed snapshot tree.
    ///
    /// 1. Every declared field, in schema order, is read from the snapshot
    ///    (or defaulted when absent), decoded, and stored.
    /// 2. With `include_unknown_fields`, the remaining keys are appended in
    ///    input order.
    /// 3. With `check_types`, the instance is validated and the first
    ///    failing field's error is returned.
    /// 4. With `freeze`, the instance is frozen.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::TypeMismatch` for the first invalid field when
    /// `check_types` is set, or any error raised by nested decoding.
    pub fn construct(
        self: &Arc<Self>,
        snapshot: Map,
        options: &ConstructOptions,
    ) -> Result<Model, ModelError> {
        tracing::debug!(
            model = %self.describe(),
            keys = snapshot.len(),
            ?options,
            "constructing model"
        );

        let mut remaining = snapshot;
        let mut data = Map::with_capacity(remaining.len().max(self.field_count()));

        for field in self.fields() {
            let key = Key::symbol(field.name());
            let matcher = field.matcher();
            let raw = remaining
                .shift_remove(&key)
                .unwrap_or_else(|| matcher.default_value());
            let value = matcher.decode(raw, options)?;
            tracing::trace!(field = field.name(), value = %value, "decoded field");
            data.insert(key, value);
        }

        if options.include_unknown_fields {
            data.extend(remaining);
        } else if !remaining.is_empty() {
            tracing::debug!(dropped = remaining.len(), "discarded undeclared keys");
        }

        let mut model = Model {
            model_type: Arc::clone(self),
            data,
            state: ModelState::Building,
        };

        if options.check_types {
            model.validate()?;
        }
        model.refresh_state();

        if options.freeze {
            model.freeze();
        }
        Ok(model)
    }

    /// Build an instance from an arbitrary value, which must be a keyed tree.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::NotAnObject` for anything other than a `Map`,
    /// otherwise as [`construct`](Self::construct).
    pub fn construct_value(
        self: &Arc<Self>,
        value: Value,
        options: &ConstructOptions,
    ) -> Result<Model, ModelError> {
        match value {
            Value::Map(map) => self.construct(map, options),
            other => Err(ModelError::NotAnObject {
                owner: self.describe(),
                actual: other.inspect(),
            }),
        }
    }

    /// Decode a snapshot value: keyed trees are constructed into instances,
    /// anything else (including an existing instance) passes through.
    ///
    /// # Errors
    ///
    /// As [`construct`](Self::construct).
    pub fn from_snapshot(
        self: &Arc<Self>,
        value: Value,
        options: &ConstructOptions,
    ) -> Result<Value, ModelError> {
        match value {
            Value::Map(map) => self.construct(map, options).map(Value::from),
            other => Ok(other),
        }
    }
}

// ─── Access ──────────────────────────────────────────────────────────

impl Model {
    /// The instance's type.
    pub fn model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Whether the instance is frozen.
    pub fn is_frozen(&self) -> bool {
        self.state == ModelState::Frozen
    }

    /// Declared fields of the instance's type, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.model_type.fields()
    }

    /// Read a declared field. A field removed through raw access reads as `Null`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownField` if the type does not declare `name`.
    pub fn get(&self, name: &str) -> Result<&Value, ModelError> {
        if self.model_type.field(name).is_none() {
            return Err(self.unknown_field(name));
        }
        Ok(self.data.get(&Key::symbol(name)).unwrap_or(&NULL))
    }

    /// Assign a declared field after checking the value against its matcher.
    ///
    /// The stored value is unchanged when this fails.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::FrozenInstance` on a frozen instance (checked
    /// first), `ModelError::UnknownField` for an undeclared name, or
    /// `ModelError::TypeMismatch` if the value does not match.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.ensure_mutable()?;
        let value = value.into();
        let field = self
            .model_type
            .field(name)
            .ok_or_else(|| self.unknown_field(name))?;
        field.matcher().check(name, &value)?;

        self.store(Key::symbol(name), value);
        self.refresh_state();
        Ok(())
    }

    /// Raw container read by key, declared or not.
    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        self.data.get(key)
    }

    /// Raw container write. Skips field validation.
    ///
    /// A declared field that is currently absent is stored back at its
    /// schema position; other new keys are appended.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::FrozenInstance` on a frozen instance.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<Option<Value>, ModelError> {
        self.ensure_mutable()?;
        let previous = self.store(key.into(), value.into());
        self.refresh_state();
        Ok(previous)
    }

    /// Raw container removal, preserving the order of the remaining keys.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::FrozenInstance` on a frozen instance.
    pub fn remove(&mut self, key: &Key) -> Result<Option<Value>, ModelError> {
        self.ensure_mutable()?;
        let removed = self.data.shift_remove(key);
        self.refresh_state();
        Ok(removed)
    }

    /// Whether the container holds `key`.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.data.contains_key(key)
    }

    /// Entries in stored order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.data.iter()
    }

    /// Keys in stored order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.data.keys()
    }

    /// Values in stored order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, Value> {
        self.data.values()
    }

    /// Number of stored entries, declared and unknown.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The type's signature.
    pub fn describe(&self) -> String {
        self.model_type.describe()
    }

    /// Freeze the instance. Irreversible.
    pub fn freeze(&mut self) {
        if !self.is_frozen() {
            tracing::debug!(model = %self.describe(), "model frozen");
        }
        self.state = ModelState::Frozen;
    }

    fn ensure_mutable(&self) -> Result<(), ModelError> {
        if self.is_frozen() {
            return Err(ModelError::FrozenInstance {
                owner: self.describe(),
            });
        }
        Ok(())
    }

    /// Write `key`, keeping declared fields at the front in schema order.
    fn store(&mut self, key: Key, value: Value) -> Option<Value> {
        if self.data.contains_key(&key) {
            return self.data.insert(key, value);
        }
        let position = match &key {
            Key::Symbol(sym) => self.model_type.field_index(sym.as_str()),
            Key::Str(_) => None,
        };
        match position {
            Some(position) => {
                let index = self
                    .model_type
                    .field_names()
                    .take(position)
                    .filter(|name| self.data.contains_key(&Key::symbol(name)))
                    .count();
                self.data.shift_insert(index, key, value)
            }
            None => self.data.insert(key, value),
        }
    }

    fn unknown_field(&self, name: &str) -> ModelError {
        ModelError::UnknownField {
            owner: self.describe(),
            name: name.to_string(),
        }
    }

    fn refresh_state(&mut self) {
        if !self.is_frozen() {
            self.state = if self.is_valid() {
                ModelState::Validated
            } else {
                ModelState::Invalid
            };
        }
    }
}

// ─── Validation ──────────────────────────────────────────────────────

impl Model {
    fn mismatches(&self) -> impl Iterator<Item = ModelError> + '_ {
        self.model_type.fields().filter_map(move |field| {
            let value = self.data.get(&Key::symbol(field.name())).unwrap_or(&NULL);
            field.matcher().check(field.name(), value).err()
        })
    }

    /// Check every declared field in schema order, failing on the first mismatch.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::TypeMismatch` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.mismatches().next() {
            Some(err) => {
                tracing::debug!(model = %self.describe(), error = %err, "validation failed");
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Whether every declared field matches its type.
    pub fn is_valid(&self) -> bool {
        self.mismatches().next().is_none()
    }

    /// Every mismatch message, in schema order. Empty iff the instance is valid.
    pub fn error_messages(&self) -> Vec<String> {
        self.mismatches().map(|err| err.to_string()).collect()
    }
}

// ─── Snapshot Output ─────────────────────────────────────────────────

impl Model {
    /// Remove declared fields whose value equals the field's default,
    /// recursing into nested instances and lists of instances first.
    ///
    /// Nothing is removed unless the whole tree can be pruned.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::FrozenInstance` if this or a nested instance
    /// is frozen.
    pub fn prune_default_values(&mut self) -> Result<(), ModelError> {
        self.ensure_prunable()?;
        self.prune_checked();
        Ok(())
    }

    /// The instance as a plain snapshot tree, nested instances included.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), snapshot_of(v)))
                .collect(),
        )
    }
}

impl Model {
    fn ensure_prunable(&self) -> Result<(), ModelError> {
        self.ensure_mutable()?;
        self.model_type.fields().try_for_each(|field| {
            match self.data.get(&Key::symbol(field.name())) {
                Some(value) => ensure_nested_prunable(value),
                None => Ok(()),
            }
        })
    }

    // Callers run `ensure_prunable` first.
    fn prune_checked(&mut self) {
        let model_type = Arc::clone(&self.model_type);

        for field in model_type.fields() {
            let key = Key::symbol(field.name());
            let Some(value) = self.data.get_mut(&key) else {
                continue;
            };
            prune_nested(value);
            if *value == field.matcher().default_value() {
                tracing::trace!(field = field.name(), "pruned default value");
                self.data.shift_remove(&key);
            }
        }

        self.refresh_state();
    }
}

fn ensure_nested_prunable(value: &Value) -> Result<(), ModelError> {
    match value {
        Value::Model(model) => model.ensure_prunable(),
        Value::List(items) => items.iter().try_for_each(ensure_nested_prunable),
        _ => Ok(()),
    }
}

fn prune_nested(value: &mut Value) {
    match value {
        Value::Model(model) => model.prune_checked(),
        Value::List(items) => items.iter_mut().for_each(prune_nested),
        _ => {}
    }
}

fn snapshot_of(value: &Value) -> Value {
    match value {
        Value::Model(model) => model.to_value(),
        Value::List(items) => Value::List(items.iter().map(snapshot_of).collect()),
        other => other.clone(),
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_entries(&self.data, serializer)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}", self.model_type.name().unwrap_or("schema"))?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{key}: {value}")?;
        }
        f.write_str(">")
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
