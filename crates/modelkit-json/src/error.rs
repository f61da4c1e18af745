//! # JSON Boundary Errors

use modelkit_core::ModelError;
use thiserror::Error;

/// Errors raised at the JSON boundary.
#[derive(Error, Debug)]
pub enum JsonError {
    /// The input text is not valid JSON. Never caught by the model layer.
    #[error("malformed snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Encoding a value tree to text failed.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The document parsed but model construction rejected it.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// `parse_one` received an array root.
    #[error("expected a single object, got an array of {0} elements")]
    UnexpectedArray(usize),
}

impl JsonError {
    /// The model-layer error, if construction was what failed.
    pub fn as_model_error(&self) -> Option<&ModelError> {
        match self {
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}
