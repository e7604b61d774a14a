//! Model artifacts: stored as base64 under a purpose key, never digested.

use crate::errors::AddressingError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Model keys the test contract loads for its predictions.
pub const KNOWN_MODEL_KEYS: [&str; 3] = ["acao_recomendada", "result_class", "qc_status"];

/// A model payload ready for `StoreModel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(rename = "modelKey")]
    pub key: String,
    /// Standard-alphabet base64 of the model bytes
    #[serde(rename = "modelData")]
    pub payload: String,
}

impl ModelArtifact {
    /// Raw model bytes.
    pub fn decode(&self) -> Result<Vec<u8>, AddressingError> {
        Ok(STANDARD.decode(&self.payload)?)
    }

    /// Whether the test contract consumes this key.
    pub fn is_known_key(&self) -> bool {
        KNOWN_MODEL_KEYS.contains(&self.key.as_str())
    }
}

/// Base64-encode `bytes` under `key`.
pub fn encode_model(key: &str, bytes: &[u8]) -> Result<ModelArtifact, AddressingError> {
    if key.trim().is_empty() {
        return Err(AddressingError::EmptyModelKey);
    }
    Ok(ModelArtifact {
        key: key.to_string(),
        payload: STANDARD.encode(bytes),
    })
}

/// Wrap an already base64-encoded payload after checking it decodes.
pub fn model_from_base64(key: &str, payload: &str) -> Result<ModelArtifact, AddressingError> {
    let artifact = ModelArtifact {
        key: key.to_string(),
        payload: payload.trim().to_string(),
    };
    if key.trim().is_empty() {
        return Err(AddressingError::EmptyModelKey);
    }
    artifact.decode()?;
    Ok(artifact)
}
