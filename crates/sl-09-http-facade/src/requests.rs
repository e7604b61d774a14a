//! Request bodies. Every field is optional at the serde level so a missing
//! field becomes a 400 with its name instead of a generic rejection.

use crate::errors::ApiError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

/// Reject absent and empty values.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::missing(field)),
    }
}

/// Decode a base64 field, tolerating a `data:<mime>;base64,` prefix.
pub fn decode_base64(encoded: &str, field: &str) -> Result<Vec<u8>, ApiError> {
    let body = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, body)| body)
        .trim();
    STANDARD
        .decode(body)
        .map_err(|e| ApiError::bad_request(format!("{field} is not valid base64: {e}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreTestRequest {
    #[serde(rename = "testID")]
    pub test_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl StoreTestRequest {
    /// `data` as a list of records; a single object is a one-item list.
    pub fn items(self) -> Result<Vec<Value>, ApiError> {
        match self.data {
            Value::Null => Err(ApiError::missing("data")),
            Value::Array(items) if items.is_empty() => Err(ApiError::missing("data")),
            Value::Array(items) => Ok(items),
            single => Ok(vec![single]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreImageRequest {
    #[serde(rename = "kitID")]
    pub kit_id: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreModelRequest {
    #[serde(rename = "modelKey")]
    pub model_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorePlanilhaRequest {
    pub lote: Option<String>,
    #[serde(rename = "planilhaHash")]
    pub planilha_hash: Option<String>,
    /// Raw spreadsheet, base64; digested locally when no hash is given
    pub planilha: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestRequest {
    #[serde(rename = "testID")]
    pub test_id: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditFieldRequest {
    #[serde(rename = "testID")]
    pub test_id: Option<String>,
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl EditFieldRequest {
    /// The new value as typed text; non-string JSON is rendered back to text
    /// so it goes through the same coercion.
    pub fn raw_value(&self) -> Result<String, ApiError> {
        match &self.value {
            Value::Null => Err(ApiError::missing("value")),
            Value::String(text) => Ok(text.clone()),
            other => Ok(other.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyTestQuery {
    #[serde(rename = "testID")]
    pub test_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyImageQuery {
    #[serde(rename = "imageHash")]
    pub image_hash: Option<String>,
}
