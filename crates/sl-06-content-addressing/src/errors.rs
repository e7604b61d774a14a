//! Content addressing error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressingError {
    /// A caller-supplied digest is not 128 hex characters.
    #[error("Invalid content digest {value:?}: {reason}")]
    InvalidDigest { value: String, reason: &'static str },

    /// The artifact file could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model payload is not valid base64.
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Model keys name the purpose of the model and cannot be empty.
    #[error("Model key must not be empty")]
    EmptyModelKey,
}
