//! # Feature Encoding
//!
//! Derives the comma-joined prediction row from a test record:
//!
//! - `control_line_ok`: booleans become `1`/`0`, other values pass through
//! - `controle_interno_result`: `ok → 2`, `fail → 1`, `invalid → 0`, anything else `0`
//! - declared numeric and categorical features: null or missing → `0`
//! - `image_blur_score`: null or missing → `0`
//! - `lat`, `lon`: no default; null or missing renders empty
//!
//! Values that cannot sit in one CSV field (arrays, objects, text with a
//! comma) fall back to the feature's default, so a vector always has
//! exactly 21 fields.
//!
//! The record is only borrowed, so the stored JSON and the vector always come
//! from the same snapshot.

use crate::errors::EncodeError;
use crate::schema::{controle_interno_code, CATEGORICAL_FEATURES, FEATURE_COUNT, FEATURE_ORDER, NUMERIC_FEATURES};
use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::debug;

/// Ordered, rendered feature values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    fields: Vec<String>,
}

impl FeatureVector {
    /// Rendered values in schema order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rendered value of a named feature.
    pub fn get(&self, feature: &str) -> Option<&str> {
        crate::schema::position(feature).map(|i| self.fields[i].as_str())
    }

    /// Split a rendered vector back into its fields.
    pub fn parse(csv: &str) -> Result<Self, EncodeError> {
        let fields: Vec<String> = csv.split(',').map(str::to_string).collect();
        if fields.len() != FEATURE_COUNT {
            return Err(EncodeError::FieldCount {
                expected: FEATURE_COUNT,
                found: fields.len(),
            });
        }
        Ok(Self { fields })
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(","))
    }
}

/// Encode a record into its feature vector.
pub fn encode_features(record: &Value) -> Result<FeatureVector, EncodeError> {
    let object = record.as_object().ok_or(EncodeError::NotAnObject {
        found: kind(record),
    })?;
    Ok(encode_object(object))
}

/// Encode an already-unwrapped record object.
pub fn encode_object(record: &Map<String, Value>) -> FeatureVector {
    let fields = FEATURE_ORDER
        .iter()
        .map(|feature| render_feature(record, feature))
        .collect();
    FeatureVector { fields }
}

fn render_feature(record: &Map<String, Value>, feature: &str) -> String {
    let value = record.get(feature).filter(|v| !v.is_null());

    match feature {
        "control_line_ok" => match value {
            Some(Value::Bool(ok)) => u8::from(*ok).to_string(),
            Some(other) => scalar(feature, other, "0"),
            None => defaulted(feature),
        },
        "controle_interno_result" => {
            let code = value.and_then(Value::as_str).and_then(controle_interno_code);
            if code.is_none() {
                debug!(feature, value = ?value, "Unknown internal control result, encoding 0");
            }
            code.unwrap_or(0).to_string()
        }
        "image_blur_score" => match value {
            Some(v) => scalar(feature, v, "0"),
            None => defaulted(feature),
        },
        _ if NUMERIC_FEATURES.contains(&feature) || CATEGORICAL_FEATURES.contains(&feature) => match value {
            Some(v) => scalar(feature, v, "0"),
            None => defaulted(feature),
        },
        _ => value.map(|v| scalar(feature, v, "")).unwrap_or_default(),
    }
}

fn defaulted(feature: &str) -> String {
    debug!(feature, "Filled missing feature with 0");
    "0".to_string()
}

/// Render a value that must occupy exactly one field, else `fallback`.
fn scalar(feature: &str, value: &Value, fallback: &str) -> String {
    let rendered = match value {
        Value::Array(_) | Value::Object(_) => None,
        other => Some(render(other)).filter(|text| !text.contains(',')),
    };
    rendered.unwrap_or_else(|| {
        debug!(feature, value = %value, "Feature value does not fit one field, using default");
        fallback.to_string()
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Integral floats render without a fractional part (`7.0` → `7`).
fn render_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
