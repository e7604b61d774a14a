//! Encoder error types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Records are JSON objects.
    #[error("Record must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// A parsed vector does not have the fixed number of fields.
    #[error("Feature vector has {found} fields, expected {expected}")]
    FieldCount { expected: usize, found: usize },
}
