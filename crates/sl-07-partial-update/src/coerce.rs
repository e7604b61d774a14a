//! Typed values from operator-entered text.
//!
//! Precedence, first match wins:
//!
//! 1. `"true"` / `"false"` → boolean
//! 2. integer → number
//! 3. finite decimal → number
//! 4. anything else → string (including empty input)

use serde_json::{Number, Value};

/// Infer a JSON value from raw text. Surrounding whitespace is ignored.
pub fn coerce_value(raw: &str) -> Value {
    let text = raw.trim();
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "" => return Value::String(text.to_string()),
        _ => {}
    }

    if let Ok(integer) = text.parse::<i64>() {
        return Value::Number(integer.into());
    }

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
