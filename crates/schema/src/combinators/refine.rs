//! REFINE / CUSTOM / REFINE-ASYNC modifiers
//!
//! Refinements run a predicate over the already validated value. They never
//! change the value. A predicate returns `bool`, or `Result<bool, E>` when
//! the check itself can fail; an `Err` becomes the usual failure code with
//! the error text in the `reason` param.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::foundation::{
    ErrorCode, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::schema::Schema;
use crate::value::Value;

/// Synchronous predicate over a value.
pub type Predicate = Arc<dyn Fn(&Value) -> Result<bool, String> + Send + Sync>;

/// Asynchronous predicate over an owned copy of a value.
pub type AsyncPredicate =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<bool, String>> + Send + Sync>;

/// What a refinement predicate may return.
pub trait RefineOutcome {
    /// `Ok(holds)`, or the reason the predicate could not decide.
    fn into_outcome(self) -> Result<bool, String>;
}

impl RefineOutcome for bool {
    fn into_outcome(self) -> Result<bool, String> {
        Ok(self)
    }
}

impl<E: fmt::Display> RefineOutcome for Result<bool, E> {
    fn into_outcome(self) -> Result<bool, String> {
        self.map_err(|e| e.to_string())
    }
}

fn share_predicate<F, R>(f: F) -> Predicate
where
    F: Fn(&Value) -> R + Send + Sync + 'static,
    R: RefineOutcome,
{
    Arc::new(move |value| f(value).into_outcome())
}

/// Turns a predicate outcome into a result; `Err` carries its `reason`.
fn judge(
    outcome: Result<bool, String>,
    code: ErrorCode,
    message: &Cow<'static, str>,
    ctx: &ValidationContext<'_>,
) -> Result<(), ValidationErrors> {
    let reason = match outcome {
        Ok(true) => return Ok(()),
        Ok(false) => None,
        Err(reason) => Some(reason),
    };
    Err(ctx
        .error(code, reason.map(|reason| ("reason", reason)))
        .with_message(message.clone())
        .into())
}

pub(crate) fn refine_output(
    out: Value,
    predicate: &Predicate,
    message: &Cow<'static, str>,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    judge(predicate(&out), ErrorCode::RefinementFailed, message, ctx)?;
    Ok(out)
}

pub(crate) fn validate_refine<C: Validate>(
    inner: &C,
    predicate: &Predicate,
    message: &Cow<'static, str>,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let out = inner.validate_in(value, ctx)?;
    refine_output(out, predicate, message, ctx)
}

// ============================================================================
// REFINE
// ============================================================================

/// `inner` plus a predicate that must hold for its output.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let even = number().int().refine(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0), "must be even");
/// let errors = even.validate(&Value::from(3)).unwrap_err();
/// assert_eq!(errors.first().code, ErrorCode::RefinementFailed);
/// assert_eq!(errors.first().message, "must be even");
///
/// let port = string().refine(|v| v.as_str().unwrap_or("").parse::<u16>().map(|p| p >= 1024), "unprivileged port");
/// let errors = port.validate(&Value::from("http")).unwrap_err();
/// assert_eq!(errors.first().code, ErrorCode::RefinementFailed);
/// assert_eq!(errors.first().param("reason"), Some("invalid digit found in string"));
/// ```
#[derive(Clone)]
pub struct RefineSchema {
    inner: Schema,
    predicate: Predicate,
    message: Cow<'static, str>,
}

impl RefineSchema {
    pub fn new<F, R>(inner: Schema, predicate: F, message: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: RefineOutcome,
    {
        Self {
            inner,
            predicate: share_predicate(predicate),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    pub(crate) fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn message_cow(&self) -> &Cow<'static, str> {
        &self.message
    }
}

impl Validate for RefineSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_refine(&self.inner, &self.predicate, &self.message, value, ctx)
    }
}

impl fmt::Debug for RefineSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefineSchema")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CUSTOM
// ============================================================================

/// Ad hoc predicate schema; fails with `CUSTOM_VALIDATION`.
#[derive(Clone)]
pub struct CustomSchema {
    predicate: Predicate,
    message: Cow<'static, str>,
}

impl CustomSchema {
    pub fn new<F, R>(predicate: F, message: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: RefineOutcome,
    {
        Self {
            predicate: share_predicate(predicate),
            message: message.into(),
        }
    }
}

impl Validate for CustomSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        judge((self.predicate)(value), ErrorCode::CustomValidation, &self.message, ctx)?;
        Ok(value.clone())
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        (self.predicate)(value) == Ok(true)
    }
}

impl fmt::Debug for CustomSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSchema")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// REFINE ASYNC
// ============================================================================

/// `inner` plus an async predicate. Only `validate_async` can run it; the
/// synchronous path reports `ASYNC_REQUIRED`.
#[derive(Clone)]
pub struct AsyncRefineSchema {
    inner: Schema,
    predicate: AsyncPredicate,
    message: Cow<'static, str>,
}

impl AsyncRefineSchema {
    pub fn new<F, Fut>(inner: Schema, predicate: F, message: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: RefineOutcome,
    {
        Self {
            inner,
            predicate: Arc::new(move |value| {
                let pending = predicate(value);
                Box::pin(async move { pending.await.into_outcome() })
            }),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Schema {
        &self.inner
    }

    /// Runs the predicate on a validated value.
    pub(crate) async fn refine(&self, out: Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let outcome = (self.predicate)(out.clone()).await;
        judge(outcome, ErrorCode::RefinementFailed, &self.message, ctx)?;
        Ok(out)
    }
}

impl Validate for AsyncRefineSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.inner.validate_in(value, ctx)?;
        Err(ctx.error(ErrorCode::AsyncRequired, []).into())
    }

    fn check_in(&self, _value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        false
    }
}

impl fmt::Debug for AsyncRefineSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRefineSchema")
            .field("inner", &self.inner)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaExt, custom, number, string};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_refine_runs_after_inner() {
        let schema = string().trim().refine(|v| v.as_str() == Some("ok"), "not ok");
        assert_eq!(schema.validate(&Value::from(" ok ")).unwrap(), Value::from("ok"));

        // inner failure short-circuits the predicate
        let errors = schema.validate(&Value::from(1)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotString]);

        let errors = schema.validate(&Value::from("nope")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::RefinementFailed]);
        assert_eq!(errors.first().message, "not ok");
    }

    #[test]
    fn test_custom() {
        let schema = custom(|v| matches!(v, Value::Number(n) if *n > 0.0), "positive please");
        assert!(schema.is(&Value::from(1)));
        let errors = schema.validate(&Value::from(-1)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::CustomValidation]);
        assert_eq!(errors.first().message, "positive please");
    }

    #[test]
    fn test_fallible_predicates_report_reason() {
        let schema = string().refine(
            |v| v.as_str().unwrap_or_default().parse::<u16>().map(|port| port >= 1024),
            "unprivileged port required",
        );
        assert!(schema.is(&Value::from("8080")));

        let errors = schema.validate(&Value::from("80")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::RefinementFailed]);
        assert_eq!(errors.first().param("reason"), None);

        let errors = schema.validate(&Value::from("http")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::RefinementFailed]);
        assert_eq!(errors.first().message, "unprivileged port required");
        assert_eq!(
            errors.first().param("reason"),
            Some("invalid digit found in string")
        );
        assert!(!schema.is(&Value::from("http")));

        let lookup = custom(
            |v| match v.as_str() {
                Some("down") => Err("directory unavailable"),
                other => Ok(other.is_some()),
            },
            "unknown user",
        );
        let errors = lookup.validate(&Value::from("down")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::CustomValidation]);
        assert_eq!(errors.first().param("reason"), Some("directory unavailable"));
        assert!(!lookup.is(&Value::from("down")));
        assert!(lookup.is(&Value::from("alice")));
    }

    #[test]
    fn test_async_refine_in_sync_path() {
        let schema = number().refine_async(|_| async { true }, "never shown");
        let errors = schema.validate(&Value::from(1)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::AsyncRequired]);
        assert!(!schema.is(&Value::from(1)));

        // inner errors still come first
        let errors = schema.validate(&Value::from("x")).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotNumber]);
    }
}
