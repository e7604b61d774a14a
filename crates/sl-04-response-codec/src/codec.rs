//! # Response Decoding
//!
//! Ledger read operations return a JSON document as raw bytes. Existing
//! clients of this network rebuild the text one character per byte, so
//! [`decode`] does the same: every byte maps to the Unicode scalar of equal
//! value (ISO-8859-1). ASCII payloads decode identically under both
//! schemes; multi-byte UTF-8 sequences do not. [`decode_utf8`] is the strict
//! alternative.

use crate::errors::DecodeError;
use serde_json::Value;
use tracing::trace;

/// Decode a ledger response, one character per byte.
///
/// An empty response is an absent result, not an error.
pub fn decode(raw: &[u8]) -> Result<Option<Value>, DecodeError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let text: String = raw.iter().map(|&byte| char::from(byte)).collect();
    trace!(bytes = raw.len(), "Decoding ledger response");
    Ok(Some(serde_json::from_str(&text)?))
}

/// Decode a ledger response as strict UTF-8.
pub fn decode_utf8(raw: &[u8]) -> Result<Option<Value>, DecodeError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let text = std::str::from_utf8(raw).map_err(|e| DecodeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(Some(serde_json::from_str(text)?))
}

/// Compact JSON bytes, as passed to contract functions.
pub fn encode(value: &Value) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Digest field of a read envelope. Accepts both the documented
/// `HashData` casing and the `hashData` the image contract emits.
pub fn hash_data(envelope: &Value) -> Option<&str> {
    envelope
        .get("HashData")
        .or_else(|| envelope.get("hashData"))
        .and_then(Value::as_str)
}
