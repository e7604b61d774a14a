//! # Dotted-Path Field Updates
//!
//! `a.b.c` walks `a` then `b`, both of which must already exist, and assigns
//! `c`, creating it if absent. Arrays are descended by existing index
//! (`readings.0.value`). The new value is not checked against the type of
//! the value it replaces.

use crate::errors::PatchError;
use serde_json::Value;
use tracing::debug;

/// Assign `new_value` at `dotted_path` inside `record`, in place.
pub fn apply_field_update(record: &mut Value, dotted_path: &str, new_value: Value) -> Result<(), PatchError> {
    if dotted_path.is_empty() {
        return Err(PatchError::EmptyPath);
    }

    let segments: Vec<&str> = dotted_path.split('.').collect();
    let (last, parents) = segments.split_last().ok_or(PatchError::EmptyPath)?;
    let prefix = |end: usize| segments[..end].join(".");

    let mut current = record;
    for (i, segment) in parents.iter().enumerate() {
        current = match current {
            Value::Object(fields) => fields
                .get_mut(*segment)
                .ok_or_else(|| PatchError::MissingField { path: prefix(i + 1) })?,
            Value::Array(items) => element(items, segment).ok_or_else(|| PatchError::MissingField {
                path: prefix(i + 1),
            })?,
            _ => return Err(PatchError::NotAnObject { path: prefix(i) }),
        };
    }

    match current {
        Value::Object(fields) => {
            fields.insert((*last).to_string(), new_value);
        }
        Value::Array(items) => {
            let slot = element(items, last).ok_or_else(|| PatchError::MissingField {
                path: dotted_path.to_string(),
            })?;
            *slot = new_value;
        }
        _ => {
            return Err(PatchError::NotAnObject {
                path: prefix(parents.len()),
            })
        }
    }

    debug!(path = dotted_path, "Applied field update");
    Ok(())
}

fn element<'v>(items: &'v mut [Value], segment: &str) -> Option<&'v mut Value> {
    segment.parse::<usize>().ok().and_then(move |index| items.get_mut(index))
}
