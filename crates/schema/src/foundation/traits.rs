//! Core traits for the validation system
//!
//! [`Validate`] is the one contract shared by schema nodes, compiled
//! validators and user decorators. Only [`Validate::validate_in`] is
//! required; everything else is derived from it.

use std::sync::Arc;

use crate::foundation::context::{ValidationContext, ValidationOptions};
use crate::foundation::error::{ParseError, ValidationErrors};
use crate::value::Value;

/// Outcome of a validation: the (possibly transformed) value, or a non-empty
/// list of errors.
pub type ValidationResult<T = Value> = Result<T, ValidationErrors>;

// ============================================================================
// CORE VALIDATOR TRAIT
// ============================================================================

/// A validator over [`Value`]s.
///
/// # Examples
///
/// A decorator that rejects empty strings before delegating:
///
/// ```
/// use nebula_schema::prelude::*;
///
/// struct NotBlank<V>(V);
///
/// impl<V: Validate> Validate for NotBlank<V> {
///     fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
///         if value.as_str().is_some_and(|s| s.trim().is_empty()) {
///             return Err(ctx.error(ErrorCode::CustomValidation, []).into());
///         }
///         self.0.validate_in(value, ctx)
///     }
/// }
///
/// let name = NotBlank(Schema::from(string()));
/// assert!(name.is(&Value::from("alice")));
/// assert!(!name.is(&Value::from("   ")));
/// ```
pub trait Validate: Send + Sync {
    /// Validates `value` at the context's current path.
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult;

    /// `true` iff [`validate_in`](Self::validate_in) would succeed.
    ///
    /// Implementations may skip building error detail, and composites stop
    /// at the first failing child.
    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.validate_in(value, ctx).is_ok()
    }

    /// Validates with default options.
    fn validate(&self, value: &Value) -> ValidationResult {
        self.validate_with(value, &ValidationOptions::default())
    }

    /// Validates with explicit options.
    fn validate_with(&self, value: &Value, options: &ValidationOptions) -> ValidationResult {
        self.validate_in(value, &ValidationContext::root(options))
    }

    /// `true` iff [`validate`](Self::validate) succeeds.
    fn is(&self, value: &Value) -> bool {
        let options = ValidationOptions::default();
        self.check_in(value, &ValidationContext::root(&options))
    }

    /// Validates and converts failure into a [`ParseError`] carrying the
    /// same error list.
    fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        self.validate(value).map_err(ParseError::Invalid)
    }

    /// Like [`parse`](Self::parse), discarding the output.
    fn assert_valid(&self, value: &Value) -> Result<(), ParseError> {
        self.parse(value).map(drop)
    }

    /// Alias of [`validate`](Self::validate).
    fn safe_parse(&self, value: &Value) -> ValidationResult {
        self.validate(value)
    }
}

impl<V: Validate + ?Sized> Validate for Arc<V> {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        (**self).validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        (**self).check_in(value, ctx)
    }
}

impl<V: Validate + ?Sized> Validate for Box<V> {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        (**self).validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        (**self).check_in(value, ctx)
    }
}

impl<V: Validate + ?Sized> Validate for &V {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        (**self).validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        (**self).check_in(value, ctx)
    }
}

// ============================================================================
// TESTS
// ============================================================================
