//! # Construction Options
//!
//! The configuration surface for building model instances. Options are
//! plain data: they derive `Deserialize` with per-field defaults so a host
//! application can load them from any configuration document, and they
//! propagate unchanged into nested model construction.

use serde::{Deserialize, Serialize};

/// Options controlling [`ModelType::construct`](crate::ModelType::construct).
///
/// | option | default | effect |
/// |---|---|---|
/// | `include_unknown_fields` | `true` | retain non-declared keys from the input tree |
/// | `check_types` | `true` | validate during construction, failing on the first invalid field |
/// | `freeze` | `false` | make the resulting instance immutable |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstructOptions {
    /// Retain keys the schema does not declare.
    pub include_unknown_fields: bool,
    /// Run full validation during construction.
    pub check_types: bool,
    /// Freeze the constructed instance.
    pub freeze: bool,
}

impl Default for ConstructOptions {
    fn default() -> Self {
        Self {
            include_unknown_fields: true,
            check_types: true,
            freeze: false,
        }
    }
}

impl ConstructOptions {
    /// Defaults with type checking disabled, for form-style validation via
    /// [`Model::error_messages`](crate::Model::error_messages).
    pub fn lenient() -> Self {
        Self {
            check_types: false,
            ..Self::default()
        }
    }

    /// Defaults with freezing enabled.
    pub fn frozen() -> Self {
        Self {
            freeze: true,
            ..Self::default()
        }
    }

    /// Set `include_unknown_fields`.
    pub fn with_unknown_fields(mut self, include: bool) -> Self {
        self.include_unknown_fields = include;
        self
    }

    /// Set `check_types`.
    pub fn with_type_checks(mut self, check: bool) -> Self {
        self.check_types = check;
        self
    }

    /// Set `freeze`.
    pub fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }
}
