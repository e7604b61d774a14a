//! # Content Digests
//!
//! Images and spreadsheets are keyed on the ledger by the SHA-512 of their
//! bytes, rendered as 128 lowercase hex characters. The digest is always
//! computed locally from the content before anything is sent.

use crate::errors::AddressingError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Length of a rendered digest.
pub const DIGEST_HEX_LEN: usize = 128;

/// SHA-512 content digest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 64]);

impl ContentDigest {
    /// Validate a digest received from a caller (query paths).
    pub fn parse(value: &str) -> Result<Self, AddressingError> {
        let invalid = |reason| AddressingError::InvalidDigest {
            value: value.to_string(),
            reason,
        };
        if value.len() != DIGEST_HEX_LEN {
            return Err(invalid("expected 128 hex characters"));
        }
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| invalid("not hexadecimal"))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex form used as the ledger key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", &self.to_hex()[..16])
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = AddressingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

/// Digest the full content in one pass.
pub fn digest(bytes: &[u8]) -> ContentDigest {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(bytes));
    ContentDigest(out)
}

/// Read a file and digest its content.
pub fn digest_file(path: &Path) -> Result<ContentDigest, AddressingError> {
    let bytes = std::fs::read(path).map_err(|source| AddressingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content_digest = digest(&bytes);
    debug!(path = %path.display(), bytes = bytes.len(), digest = %content_digest, "Digested file");
    Ok(content_digest)
}
