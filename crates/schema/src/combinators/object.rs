//! OBJECT combinator - fixed shape of named fields
//!
//! Every shape key is validated, present or not: an absent key validates as
//! [`Value::Undefined`], so required fields fail and optional fields pass.
//! Field outputs equal to `Undefined` are left out of the result object.
//! Keys outside the shape follow the [`UnknownKeys`] policy or go through a
//! catchall schema. Passthrough copies are sanitized, so dangerous keys
//! nested inside them are dropped too.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::foundation::{
    ErrorCode, ErrorSink, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::{Schema, SchemaExt};
use crate::security::{is_dangerous_key, sanitize};
use crate::value::{Object, Value};

// ============================================================================
// UNKNOWN KEY POLICY
// ============================================================================

/// What happens to input keys the shape does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Report `OBJECT_UNKNOWN_KEY` for each.
    Strict,
    /// Copy them to the output unvalidated.
    Passthrough,
}

/// Resolved handling of one unknown key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnknownKeyAction {
    Drop,
    Reject(ErrorCode),
    Keep,
    Catchall,
}

pub(crate) fn unknown_key_action(
    key: &str,
    policy: UnknownKeys,
    has_catchall: bool,
    ctx: &ValidationContext<'_>,
) -> UnknownKeyAction {
    if ctx.options().strip_unknown {
        return UnknownKeyAction::Drop;
    }
    let dangerous = is_dangerous_key(key);
    if has_catchall {
        return if dangerous {
            UnknownKeyAction::Reject(ErrorCode::ObjectForbiddenKey)
        } else {
            UnknownKeyAction::Catchall
        };
    }
    match policy {
        UnknownKeys::Strip => UnknownKeyAction::Drop,
        UnknownKeys::Strict if dangerous => UnknownKeyAction::Reject(ErrorCode::ObjectForbiddenKey),
        UnknownKeys::Strict => UnknownKeyAction::Reject(ErrorCode::ObjectUnknownKey),
        UnknownKeys::Passthrough if dangerous => {
            UnknownKeyAction::Reject(ErrorCode::ObjectForbiddenKey)
        }
        UnknownKeys::Passthrough => UnknownKeyAction::Keep,
    }
}

/// Type gate plus depth guard shared by every object-like validator.
pub(crate) fn object_gate<'v>(
    value: &'v Value,
    ctx: &ValidationContext<'_>,
) -> Result<&'v Object, ValidationErrors> {
    let Value::Object(map) = value else {
        return Err(ctx
            .error(ErrorCode::NotObject, [("received", value.type_name().to_owned())])
            .into());
    };
    match ctx.depth_exceeded() {
        Some(error) => Err(error.into()),
        None => Ok(map),
    }
}

pub(crate) fn key_error(ctx: &ValidationContext<'_>, key: &str, code: ErrorCode) -> ValidationErrors {
    ctx.key(key).error(code, [("key", key.to_owned())]).into()
}

// ============================================================================
// SHARED ALGORITHM
// ============================================================================

/// Object validation over any child validator type. Interpreted schemas and
/// compiled closures both run through here.
pub(crate) fn validate_object<C: Validate>(
    shape: &IndexMap<String, C>,
    policy: UnknownKeys,
    catchall: Option<&C>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let input = object_gate(value, ctx)?;
    let mut sink = ErrorSink::new(ctx.abort_early());
    let mut output = Object::with_capacity(shape.len());

    for (key, field) in shape {
        let raw = input.get(key).unwrap_or(&Value::Undefined);
        match field.validate_in(raw, &ctx.key(key)) {
            Ok(out) if out.is_undefined() => {}
            Ok(out) => {
                output.insert(key.clone(), out);
            }
            Err(errors) => {
                sink.append(errors);
                if sink.should_stop() {
                    return sink.finish(Value::Undefined);
                }
            }
        }
    }

    for (key, raw) in input {
        if shape.contains_key(key) {
            continue;
        }
        match unknown_key_action(key, policy, catchall.is_some(), ctx) {
            UnknownKeyAction::Drop => {}
            UnknownKeyAction::Keep => {
                output.insert(key.clone(), sanitize(raw.clone()));
            }
            UnknownKeyAction::Reject(code) => sink.append(key_error(ctx, key, code)),
            UnknownKeyAction::Catchall => {
                if let Some(catchall) = catchall {
                    match catchall.validate_in(raw, &ctx.key(key)) {
                        Ok(out) if out.is_undefined() => {}
                        Ok(out) => {
                            output.insert(key.clone(), out);
                        }
                        Err(errors) => sink.append(errors),
                    }
                }
            }
        }
        if sink.should_stop() {
            break;
        }
    }

    sink.finish(Value::Object(output))
}

pub(crate) fn check_object<C: Validate>(
    shape: &IndexMap<String, C>,
    policy: UnknownKeys,
    catchall: Option<&C>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> bool {
    let Value::Object(input) = value else {
        return false;
    };
    if !ctx.within_depth() {
        return false;
    }
    let fields_ok = shape.iter().all(|(key, field)| {
        field.check_in(input.get(key).unwrap_or(&Value::Undefined), &ctx.key(key))
    });
    fields_ok
        && input
            .iter()
            .filter(|(key, _)| !shape.contains_key(key.as_str()))
            .all(
                |(key, raw)| match unknown_key_action(key, policy, catchall.is_some(), ctx) {
                    UnknownKeyAction::Drop | UnknownKeyAction::Keep => true,
                    UnknownKeyAction::Reject(_) => false,
                    UnknownKeyAction::Catchall => {
                        catchall.is_some_and(|c| c.check_in(raw, &ctx.key(key)))
                    }
                },
            )
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Builder and validator for objects with a known shape.
///
/// # Examples
///
/// ```
/// use nebula_schema::prelude::*;
/// use serde_json::json;
///
/// let user = object()
///     .field("name", string().min(1))
///     .field("age", number().int().nonnegative().optional())
///     .strict();
///
/// assert!(user.is(&json!({"name": "alice"}).into()));
///
/// let errors = user.validate(&json!({"name": "", "admin": true}).into()).unwrap_err();
/// assert_eq!(errors.paths(), vec!["name", "admin"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    shape: IndexMap<String, Schema>,
    unknown: UnknownKeys,
    catchall: Option<Schema>,
}

impl ObjectSchema {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shape: IndexMap::new(),
            unknown: UnknownKeys::Strip,
            catchall: None,
        }
    }

    /// Adds (or replaces) a field.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, key: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.shape.insert(key.into(), schema.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn strict(mut self) -> Self {
        self.unknown = UnknownKeys::Strict;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn strip(mut self) -> Self {
        self.unknown = UnknownKeys::Strip;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn passthrough(mut self) -> Self {
        self.unknown = UnknownKeys::Passthrough;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown = policy;
        self
    }

    /// Validates unknown keys with `schema` instead of applying the policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn catchall(mut self, schema: impl Into<Schema>) -> Self {
        self.catchall = Some(schema.into());
        self
    }

    /// Adds every field of `other`, replacing fields with the same key.
    /// Policy and catchall stay as they are.
    #[must_use = "builder methods must be chained or built"]
    pub fn extend(mut self, other: &Self) -> Self {
        for (key, schema) in &other.shape {
            self.shape.insert(key.clone(), schema.clone());
        }
        self
    }

    /// Like [`extend`](Self::extend), but `other`'s policy and catchall win.
    #[must_use = "builder methods must be chained or built"]
    pub fn merge(self, other: &Self) -> Self {
        let mut merged = self.extend(other);
        merged.unknown = other.unknown;
        merged.catchall.clone_from(&other.catchall);
        merged
    }

    /// Keeps only the listed fields.
    #[must_use = "builder methods must be chained or built"]
    pub fn pick(mut self, keys: &[&str]) -> Self {
        self.shape.retain(|key, _| keys.contains(&key.as_str()));
        self
    }

    /// Drops the listed fields.
    #[must_use = "builder methods must be chained or built"]
    pub fn omit(mut self, keys: &[&str]) -> Self {
        self.shape.retain(|key, _| !keys.contains(&key.as_str()));
        self
    }

    /// Makes every field optional.
    #[must_use = "builder methods must be chained or built"]
    pub fn partial(mut self) -> Self {
        for schema in self.shape.values_mut() {
            *schema = schema.clone().optional();
        }
        self
    }

    #[must_use]
    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.shape
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.keys().map(String::as_str)
    }

    #[must_use]
    pub fn policy(&self) -> UnknownKeys {
        self.unknown
    }

    #[must_use]
    pub fn catchall_schema(&self) -> Option<&Schema> {
        self.catchall.as_ref()
    }
}

impl Validate for ObjectSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_object(&self.shape, self.unknown, self.catchall.as_ref(), value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        check_object(&self.shape, self.unknown, self.catchall.as_ref(), value, ctx)
    }
}

// ============================================================================
// TESTS
// ============================================================================
