//! # modelkit-json — JSON Boundary for modelkit
//!
//! Reads model instances from JSON documents and writes them back. This is
//! the only crate in the workspace that touches text; `modelkit-core` works
//! purely on decoded value trees.
//!
//! ## Flow
//!
//! ```text
//! text ──decode──▶ Value (symbol keys) ──construct──▶ Model
//! Model ──encode──▶ text (declared fields in schema order)
//! ```
//!
//! ## Example
//!
//! ```
//! use modelkit_core::{ConstructOptions, EnumType, ModelType, Primitive};
//! use modelkit_json::{dump, parse_one};
//!
//! let person = ModelType::builder("Person")
//!     .field("name", Primitive::String)?
//!     .field("gender", EnumType::symbols(["male", "female"]))?
//!     .field("age", 1..=100)?
//!     .build();
//!
//! let text = r#"{"name":"Anna","gender":"female","age":29}"#;
//! let anna = parse_one(&person, text, &ConstructOptions::default())?;
//! assert_eq!(dump(&anna)?, text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `modelkit-core` internally.
//! - Malformed text is always `JsonError::Malformed`; construction failures
//!   always surface as `JsonError::Model`, never mixed.

pub mod decode;
pub mod encode;
pub mod error;
pub mod parse;

pub use decode::{decode, decode_with, KeyStyle};
pub use encode::{encode, encode_pretty};
pub use error::JsonError;
pub use parse::{dump, dump_pretty, parse, parse_one, Parsed};
