//! Partial update error types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatchError {
    /// No field was named.
    #[error("Field path is empty")]
    EmptyPath,

    /// An intermediate field does not exist.
    #[error("Missing field: {path}")]
    MissingField {
        /// First prefix of the dotted path that could not be resolved
        path: String,
    },

    /// An intermediate value is a scalar and cannot hold fields.
    #[error("Field {path} is not an object")]
    NotAnObject { path: String },
}
