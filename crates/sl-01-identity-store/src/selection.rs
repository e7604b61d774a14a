//! # Credential File Selection
//!
//! MSP directories (`signcerts/`, `keystore/`) normally hold a single file.
//! The selection policy decides what happens when they do not.

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// How a credential file is chosen from its directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSelection {
    /// Take the first entry ordered by file name. Extra entries are ignored
    /// with a warning.
    #[default]
    FirstEntry,
    /// Exactly one entry must exist; anything else is a configuration error.
    RequireSingle,
}

impl CredentialSelection {
    /// Parse a policy name (`first` / `single`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "first" | "first_entry" => Some(Self::FirstEntry),
            "single" | "require_single" => Some(Self::RequireSingle),
            _ => None,
        }
    }
}

/// Resolve the credential file inside `dir` according to `policy`.
pub fn select_entry(dir: &Path, policy: CredentialSelection) -> Result<PathBuf, IdentityError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| IdentityError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IdentityError::io(dir, e))?;

    if entries.is_empty() {
        return Err(IdentityError::NotFound {
            dir: dir.to_path_buf(),
        });
    }

    entries.sort();

    if entries.len() > 1 {
        match policy {
            CredentialSelection::RequireSingle => {
                return Err(IdentityError::Ambiguous {
                    dir: dir.to_path_buf(),
                    count: entries.len(),
                });
            }
            CredentialSelection::FirstEntry => {
                warn!(
                    dir = %dir.display(),
                    count = entries.len(),
                    chosen = %entries[0].display(),
                    "Multiple credential files found, using the first"
                );
            }
        }
    }

    Ok(entries.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = select_entry(dir.path(), CredentialSelection::FirstEntry).unwrap_err();
        assert!(matches!(err, IdentityError::NotFound { .. }));
    }

    #[test]
    fn test_first_entry_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-cert.pem"), b"b").unwrap();
        fs::write(dir.path().join("a-cert.pem"), b"a").unwrap();

        let chosen = select_entry(dir.path(), CredentialSelection::FirstEntry).unwrap();
        assert_eq!(chosen.file_name().unwrap(), "a-cert.pem");
    }

    #[test]
    fn test_require_single_rejects_ambiguity() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one"), b"1").unwrap();
        fs::write(dir.path().join("two"), b"2").unwrap();

        let err = select_entry(dir.path(), CredentialSelection::RequireSingle).unwrap_err();
        assert!(matches!(err, IdentityError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_require_single_accepts_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only"), b"1").unwrap();
        assert!(select_entry(dir.path(), CredentialSelection::RequireSingle).is_ok());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = select_entry(
            Path::new("/definitely/not/here"),
            CredentialSelection::FirstEntry,
        )
        .unwrap_err();
        assert!(matches!(err, IdentityError::Io { .. }));
    }

    #[test]
    fn test_parse_policy_names() {
        assert_eq!(
            CredentialSelection::parse("first"),
            Some(CredentialSelection::FirstEntry)
        );
        assert_eq!(
            CredentialSelection::parse("SINGLE"),
            Some(CredentialSelection::RequireSingle)
        );
        assert_eq!(CredentialSelection::parse("random"), None);
    }
}
