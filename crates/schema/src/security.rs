//! Object-safety helpers.
//!
//! Some keys are never legitimate object data and are dangerous when the
//! output is handed to a consumer that treats them as structure (prototype
//! pollution in JavaScript hosts, template engines, ORMs). Object and record
//! validators check every input key against [`DANGEROUS_KEYS`] before
//! iterating: unknown dangerous keys are dropped under the strip policy and
//! reported as `OBJECT_FORBIDDEN_KEY` everywhere else. Record keys rewritten
//! by a key schema are checked again after the rewrite.

use crate::value::Value;

/// Keys that never reach validated output unless a shape declares them.
pub const DANGEROUS_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

/// `true` if `key` is on the deny list.
#[must_use]
pub fn is_dangerous_key(key: &str) -> bool {
    DANGEROUS_KEYS.contains(&key)
}

/// Removes dangerous keys from every object in `value`, at any depth.
///
/// Applied to values copied by passthrough objects, and useful for any data
/// merged into validated output without going through a schema.
#[must_use]
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !is_dangerous_key(k))
                .map(|(k, v)| (k, sanitize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Set(items) => Value::Set(items.into_iter().map(sanitize).collect()),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (sanitize(k), sanitize(v)))
                .collect(),
        ),
        other => other,
    }
}
