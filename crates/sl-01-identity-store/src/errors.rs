//! Identity store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving credentials from the local MSP directories.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The credential or key directory has no entries.
    #[error("No files in directory: {}", dir.display())]
    NotFound {
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// More than one candidate entry under the strict selection policy.
    #[error("Ambiguous credential directory {}: {count} entries, expected exactly one", dir.display())]
    Ambiguous {
        /// Directory that was scanned
        dir: PathBuf,
        /// Number of entries found
        count: usize,
    },

    /// Filesystem failure while listing or reading an entry.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The private key bytes are not a usable P-256 key.
    #[error("Malformed private key in {}: {reason}", path.display())]
    KeyParse {
        /// Key file path
        path: PathBuf,
        /// Parser diagnostic
        reason: String,
    },

    /// The signing backend rejected the digest.
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl IdentityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
