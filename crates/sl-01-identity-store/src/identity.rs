//! Client identity: MSP id plus the enrollment certificate bytes.

use crate::errors::IdentityError;
use crate::selection::{select_entry, CredentialSelection};
use std::path::Path;
use tracing::debug;

/// Immutable client identity presented to the ledger as the transaction
/// creator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    credentials: Vec<u8>,
}

impl Identity {
    /// Build an identity from already-loaded certificate bytes.
    pub fn new(msp_id: impl Into<String>, credentials: Vec<u8>) -> Self {
        Self {
            msp_id: msp_id.into(),
            credentials,
        }
    }

    /// Organization (MSP) identifier.
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM certificate bytes exactly as read from disk.
    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }
}

/// Load the identity certificate from `cert_dir` (the MSP `signcerts/`
/// directory).
pub fn load_identity(
    msp_id: &str,
    cert_dir: &Path,
    policy: CredentialSelection,
) -> Result<Identity, IdentityError> {
    let cert_path = select_entry(cert_dir, policy)?;
    let credentials = std::fs::read(&cert_path).map_err(|e| IdentityError::io(&cert_path, e))?;

    debug!(
        msp_id,
        cert = %cert_path.display(),
        bytes = credentials.len(),
        "Loaded client identity"
    );

    Ok(Identity::new(msp_id, credentials))
}
