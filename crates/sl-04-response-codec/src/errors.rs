//! Decode error types.

use thiserror::Error;

/// Raw response bytes could not be turned into a JSON value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The text is not valid JSON.
    #[error("Malformed JSON at line {line}, column {column}: {reason}")]
    Malformed {
        line: usize,
        column: usize,
        reason: String,
    },

    /// Strict decoding met a byte sequence that is not UTF-8.
    #[error("Response is not valid UTF-8 after {valid_up_to} bytes")]
    InvalidUtf8 { valid_up_to: usize },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            line: err.line(),
            column: err.column(),
            reason: err.to_string(),
        }
    }
}
