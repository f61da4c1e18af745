//! # Error Types
//!
//! Defines the error type shared by every stage of the model lifecycle:
//! schema declaration, type-constructor lookup, instance construction,
//! field assignment, and validation. All variants use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Message Shape
//!
//! A `TypeMismatch` always renders as
//! `expected <field> to be <matcher signature>, got <value>`, in that
//! fixed order. The advisory `Model::error_messages()` API collects the
//! exact same strings that the raising paths return.

use thiserror::Error;

/// Top-level error type for model declaration, construction, and validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A field declaration was rejected while building a model type.
    #[error("cannot declare field {name:?} on {owner}: {reason}")]
    Declaration {
        /// Signature of the type being built.
        owner: String,
        /// The rejected field name.
        name: String,
        /// Why the declaration was rejected.
        reason: String,
    },

    /// A value failed its field's matcher.
    #[error("expected {field} to be {expected}, got {actual}")]
    TypeMismatch {
        /// The field whose value was checked.
        field: String,
        /// The matcher's canonical signature.
        expected: String,
        /// Diagnostic form of the offending value.
        actual: String,
    },

    /// A mutation was attempted on a frozen instance.
    #[error("can't modify frozen {owner}")]
    FrozenInstance {
        /// Signature of the instance's type.
        owner: String,
    },

    /// A named accessor was used for a field the type does not declare.
    #[error("{owner} has no field named {name:?}")]
    UnknownField {
        /// Signature of the instance's type.
        owner: String,
        /// The requested field name.
        name: String,
    },

    /// A registry lookup named a constructor that was never registered.
    #[error("unknown type constructor: {0}")]
    UnknownTypeConstructor(String),

    /// A registered constructor rejected its arguments.
    #[error("invalid arguments for {constructor}: {reason}")]
    InvalidTypeArguments {
        /// The constructor name.
        constructor: String,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// Construction was given something other than a keyed tree.
    #[error("cannot build {owner} from {actual}: expected a keyed object")]
    NotAnObject {
        /// Signature of the type being constructed.
        owner: String,
        /// Diagnostic form of the value received.
        actual: String,
    },
}

impl ModelError {
    /// Build a `TypeMismatch` for `field`.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error reports a value failing its matcher.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
