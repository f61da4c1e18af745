//! # modelkit-core — Schema-Driven Record Types
//!
//! Declare a record type as an ordered set of typed fields, then build
//! validated instances from keyed value trees, report every invalid field
//! without raising, and dump instances back to snapshot form.
//!
//! ## Layers
//!
//! - **Values** (`value.rs`): the decoded-snapshot tree. Keys are symbols
//!   (identifier-style) or raw strings; maps keep insertion order.
//!
//! - **Field types** (`field.rs`, `primitive.rs`): the [`FieldType`]
//!   capability and the [`Matcher`] tagged union (primitive, enum, list,
//!   nullable, nested model, custom). Matching is recursive and total.
//!
//! - **Registry** (`registry.rs`): named type constructors (`list`,
//!   `nullable`, `enum`) extensible with user registrations.
//!
//! - **Schemas** (`schema.rs`): [`ModelType`], an ordered field map with
//!   declaration-time accessor collision checks.
//!
//! - **Instances** (`model.rs`): [`Model`], the schema-bound container with
//!   construction, fail-fast and advisory validation, checked setters,
//!   freezing, and default pruning.
//!
//! ## Example
//!
//! ```
//! use modelkit_core::{keyed, one_of, ConstructOptions, ModelType, Primitive, Value};
//!
//! let person = ModelType::builder("Person")
//!     .field("name", Primitive::String)?
//!     .field("gender", one_of([Value::symbol("male"), Value::symbol("female")]))?
//!     .field("age", 1..=100)?
//!     .build();
//!
//! let snapshot = keyed([
//!     ("name", Value::str("Anna")),
//!     ("gender", Value::str("female")),
//!     ("age", Value::Int(9000)),
//! ]);
//! let anna = person.construct(snapshot, &ConstructOptions::lenient())?;
//! assert_eq!(anna.error_messages(), ["expected age to be 1..100, got 9000"]);
//! # Ok::<(), modelkit_core::ModelError>(())
//! ```
//!
//! ## Crate Policy
//!
//! - No dependencies on other `modelkit-*` crates.
//! - No global mutable state. Types are immutable once built and shared
//!   through `Arc`; instances are plain owned values.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod field;
pub mod model;
pub mod options;
pub mod primitive;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::ModelError;
pub use field::{EnumType, FieldType, ListType, Matcher, NullableType};
pub use model::{Model, ModelState};
pub use options::ConstructOptions;
pub use primitive::Primitive;
pub use registry::{list, list_non_empty, nullable, one_of, TypeArg, TypeConstructor, TypeRegistry};
pub use schema::{Field, FieldOptions, ModelType, ModelTypeBuilder, BUILTIN_ACCESSORS};
pub use value::{keyed, Key, Map, Symbol, Value};
