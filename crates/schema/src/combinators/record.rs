//! RECORD combinator - string-keyed dictionaries

use std::collections::HashSet;

use crate::combinators::object::{key_error, object_gate};
use crate::foundation::{
    ErrorCode, ErrorSink, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::Schema;
use crate::security::is_dangerous_key;
use crate::value::{Object, Value};

/// Output key for `key`: the key schema's string output, or `key` itself.
pub(crate) fn rewrite_key(validated: Value, key: &str) -> String {
    match validated {
        Value::String(rewritten) => rewritten,
        _ => key.to_owned(),
    }
}

/// Reserves `out_key` in the output. Rewritten keys are checked against the
/// deny-list again, and two input keys may not land on the same output key.
pub(crate) fn claim_key(
    out_key: &str,
    at_key: &ValidationContext<'_>,
    seen: &mut HashSet<String>,
) -> Result<(), ValidationErrors> {
    let code = if is_dangerous_key(out_key) {
        ErrorCode::ObjectForbiddenKey
    } else if !seen.insert(out_key.to_owned()) {
        ErrorCode::ObjectDuplicateKey
    } else {
        return Ok(());
    };
    Err(at_key.error(code, [("key", out_key.to_owned())]).into())
}

pub(crate) fn validate_record<C: Validate>(
    key_schema: Option<&C>,
    value_schema: &C,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let input = object_gate(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Object::with_capacity(input.len());
    let mut seen = HashSet::with_capacity(input.len());

    for (key, raw) in input {
        if is_dangerous_key(key) {
            sink.append(key_error(ctx, key, ErrorCode::ObjectForbiddenKey));
            if sink.should_stop() {
                break;
            }
            continue;
        }

        let at_key = ctx.key(key);
        let raw_key = Value::String(key.clone());
        let out_key = match key_schema.map(|k| k.validate_in(&raw_key, &at_key)) {
            None => Some(key.clone()),
            Some(Ok(validated)) => Some(rewrite_key(validated, key)),
            Some(Err(errors)) => {
                sink.append(errors);
                None
            }
        };
        if let Some(claimed) = &out_key
            && let Err(errors) = claim_key(claimed, &at_key, &mut seen)
        {
            sink.append(errors);
            if sink.should_stop() {
                break;
            }
            continue;
        }
        if sink.should_stop() {
            break;
        }

        match value_schema.validate_in(raw, &at_key) {
            Ok(out) => {
                if let Some(out_key) = out_key.filter(|_| !out.is_undefined()) {
                    output.insert(out_key, out);
                }
            }
            Err(errors) => sink.append(errors),
        }
        if sink.should_stop() {
            break;
        }
    }

    sink.finish(Value::Object(output))
}

pub(crate) fn check_record<C: Validate>(
    key_schema: Option<&C>,
    value_schema: &C,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> bool {
    let Value::Object(input) = value else {
        return false;
    };
    let mut seen = HashSet::with_capacity(input.len());
    ctx.within_depth()
        && input.iter().all(|(key, raw)| {
            let at_key = ctx.key(key);
            if is_dangerous_key(key) {
                return false;
            }
            let out_key = match key_schema {
                None => key.clone(),
                Some(k) => match k.validate_in(&Value::String(key.clone()), &at_key) {
                    Ok(validated) => rewrite_key(validated, key),
                    Err(_) => return false,
                },
            };
            claim_key(&out_key, &at_key, &mut seen).is_ok() && value_schema.check_in(raw, &at_key)
        })
}

/// Dictionary with arbitrary string keys and uniform values.
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let scores = record(number().int()).keys(string().min(2));
/// assert!(scores.is(&json!({"alice": 3, "bob": 5}).into()));
///
/// let errors = scores.validate(&json!({"x": 1, "carol": 1.5}).into()).unwrap_err();
/// assert_eq!(errors.paths(), vec!["x", "carol"]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordSchema {
    key: Option<Schema>,
    value: Schema,
}

impl RecordSchema {
    pub fn new(value: impl Into<Schema>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    /// Validates every key, as a string value, with `schema`.
    #[must_use = "builder methods must be chained or built"]
    pub fn keys(mut self, schema: impl Into<Schema>) -> Self {
        self.key = Some(schema.into());
        self
    }

    #[must_use]
    pub fn key_schema(&self) -> Option<&Schema> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn value_schema(&self) -> &Schema {
        &self.value
    }
}

impl Validate for RecordSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_record(self.key.as_ref(), &self.value, value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        check_record(self.key.as_ref(), &self.value, value, ctx)
    }
}
