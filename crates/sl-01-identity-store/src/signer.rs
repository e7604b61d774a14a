//! # Transaction Signer (P-256)
//!
//! Fabric-style networks issue ECDSA P-256 enrollment keys. Signatures are
//! produced over a digest computed by the caller (the gateway session owns
//! the hash algorithm), low-S normalized and DER encoded, which is the form
//! peers and orderers accept.

use crate::errors::IdentityError;
use crate::selection::{select_entry, CredentialSelection};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;
use std::fmt;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

/// Private-key-backed signing capability.
///
/// The key material never leaves this type; `Debug` output is redacted.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Parse a PEM private key (PKCS#8, or SEC1 `EC PRIVATE KEY`).
    ///
    /// `origin` is only used to label errors.
    pub fn from_pem(pem: &[u8], origin: &Path) -> Result<Self, IdentityError> {
        let text = std::str::from_utf8(pem).map_err(|_| IdentityError::KeyParse {
            path: origin.to_path_buf(),
            reason: "key file is not PEM text".into(),
        })?;

        let key = SigningKey::from_pkcs8_pem(text)
            .or_else(|pkcs8_err| {
                SecretKey::from_sec1_pem(text)
                    .map(SigningKey::from)
                    .map_err(|_| pkcs8_err)
            })
            .map_err(|e| IdentityError::KeyParse {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self { key })
    }

    /// Wrap an existing signing key.
    pub fn from_signing_key(key: SigningKey) -> Self {
        Self { key }
    }

    /// Fresh random key, for in-process ledgers that do not check certificates.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Sign a precomputed message digest.
    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let signature: Signature = self
            .key
            .sign_prehash(digest)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// Public half of the key, for verification.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key().clone()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

/// Load the signing key from `key_dir` (the MSP `keystore/` directory).
pub fn load_signer(key_dir: &Path, policy: CredentialSelection) -> Result<Signer, IdentityError> {
    let key_path = select_entry(key_dir, policy)?;
    let pem = Zeroizing::new(std::fs::read(&key_path).map_err(|e| IdentityError::io(&key_path, e))?);
    let signer = Signer::from_pem(&pem, &key_path)?;

    debug!(key = %key_path.display(), "Loaded signing key");
    Ok(signer)
}
