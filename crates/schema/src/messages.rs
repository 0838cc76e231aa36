//! Error message templates.
//!
//! Every [`ErrorCode`] has an English default template. Templates are plain
//! text with `{param}` placeholders filled from the error's params, e.g.
//! `"String must contain at least {min} character(s)"`. Callers can override
//! any code with a [`MessageTable`], either with other text or with a closure
//! over the params:
//!
//! ```
//! use nebula_schema::messages::{MessageTable, resolve_message};
//! use nebula_schema::{ErrorCode, ErrorParams};
//!
//! let table = MessageTable::new()
//!     .with_text(ErrorCode::NotString, "Bitte einen Text eingeben")
//!     .with_fn(ErrorCode::StringTooShort, |params| format!("{} param(s)", params.len()));
//!
//! let params = ErrorParams::new();
//! assert_eq!(resolve_message(ErrorCode::NotString, &params, Some(&table)), "Bitte einen Text eingeben");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::{ErrorCode, ErrorParams};

/// Closure form of a template.
pub type RenderFn = dyn Fn(&ErrorParams) -> String + Send + Sync;

/// One message template.
#[derive(Clone)]
pub enum MessageTemplate {
    /// Text with `{param}` placeholders.
    Text(Cow<'static, str>),
    /// Arbitrary rendering over the params.
    Render(Arc<RenderFn>),
}

impl fmt::Debug for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Render(_) => f.debug_tuple("Render").field(&"<fn>").finish(),
        }
    }
}

impl MessageTemplate {
    fn render(&self, params: &ErrorParams) -> Cow<'static, str> {
        match self {
            Self::Text(text) => interpolate(text.clone(), params),
            Self::Render(render) => Cow::Owned(render(params)),
        }
    }
}

/// Per-code overrides merged over the English defaults.
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    templates: HashMap<ErrorCode, MessageTemplate>,
}

impl MessageTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides `code` with a text template.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_text(mut self, code: ErrorCode, text: impl Into<Cow<'static, str>>) -> Self {
        self.templates
            .insert(code, MessageTemplate::Text(text.into()));
        self
    }

    /// Overrides `code` with a rendering closure.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_fn<F>(mut self, code: ErrorCode, render: F) -> Self
    where
        F: Fn(&ErrorParams) -> String + Send + Sync + 'static,
    {
        self.templates
            .insert(code, MessageTemplate::Render(Arc::new(render)));
        self
    }

    #[must_use]
    pub fn get(&self, code: ErrorCode) -> Option<&MessageTemplate> {
        self.templates.get(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// English default template for `code`.
#[must_use]
pub const fn default_template(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotString => "Expected string, received {received}",
        ErrorCode::NotNumber => "Expected number, received {received}",
        ErrorCode::NotBoolean => "Expected boolean, received {received}",
        ErrorCode::NotDate => "Expected date, received {received}",
        ErrorCode::NotNull => "Expected null, received {received}",
        ErrorCode::NotObject => "Expected object, received {received}",
        ErrorCode::NotArray => "Expected array, received {received}",
        ErrorCode::NotMap => "Expected map, received {received}",
        ErrorCode::NotSet => "Expected set, received {received}",
        ErrorCode::StringTooShort => "String must contain at least {min} character(s)",
        ErrorCode::StringTooLong => "String must contain at most {max} character(s)",
        ErrorCode::StringPatternMismatch => "String does not match pattern {pattern}",
        ErrorCode::StringInvalidFormat => "Invalid string: {reason}",
        ErrorCode::StringInvalidEmail => "Invalid email address",
        ErrorCode::StringInvalidUrl => "Invalid URL",
        ErrorCode::StringInvalidUuid => "Invalid UUID",
        ErrorCode::StringInvalidDatetime => "Invalid datetime, expected RFC 3339",
        ErrorCode::NumberNotFinite => "Number must be finite",
        ErrorCode::NumberNotInteger => "Expected integer, received {received}",
        ErrorCode::NumberNotSafeInteger => "Number must be a safe integer",
        ErrorCode::NumberTooSmall => "Number must be {comparison} {min}",
        ErrorCode::NumberTooBig => "Number must be {comparison} {max}",
        ErrorCode::NumberNotPositive => "Number must be {expected}",
        ErrorCode::NumberNotNegative => "Number must be {expected}",
        ErrorCode::NumberNotMultipleOf => "Number must be a multiple of {multiple}",
        ErrorCode::DateTooEarly => "Date must be on or after {min}",
        ErrorCode::DateTooLate => "Date must be on or before {max}",
        ErrorCode::LiteralMismatch => "Expected {expected}, received {received}",
        ErrorCode::EnumMismatch => "Expected one of {options}, received {received}",
        ErrorCode::ArrayTooShort => "Array must contain at least {min} element(s)",
        ErrorCode::ArrayTooLong => "Array must contain at most {max} element(s)",
        ErrorCode::ArrayNotUnique => "Array elements must be unique",
        ErrorCode::SetTooSmall => "Set must contain at least {min} element(s)",
        ErrorCode::SetTooBig => "Set must contain at most {max} element(s)",
        ErrorCode::ObjectUnknownKey => "Unrecognized key: {key}",
        ErrorCode::ObjectMissingKey => "Missing required key: {key}",
        ErrorCode::ObjectForbiddenKey => "Forbidden key: {key}",
        ErrorCode::ObjectDuplicateKey => "Duplicate key: {key}",
        ErrorCode::UnionNoMatch => "Value does not match any of the allowed types",
        ErrorCode::IntersectionConflict => "Intersection results could not be merged",
        ErrorCode::RefinementFailed => "Invalid value",
        ErrorCode::TransformFailed => "Transform failed: {reason}",
        ErrorCode::CustomValidation => "Invalid value",
        ErrorCode::AsyncRequired => "This schema contains async checks, use validate_async",
        ErrorCode::MaxDepthExceeded => "Maximum nesting depth of {max_depth} exceeded",
        ErrorCode::Never => "No value is allowed here",
        ErrorCode::UnknownError => "Unknown validation error",
    }
}

/// Resolves the message for `code`: the override from `overrides` when one
/// exists, the English default otherwise.
#[must_use]
pub fn resolve_message(
    code: ErrorCode,
    params: &ErrorParams,
    overrides: Option<&MessageTable>,
) -> Cow<'static, str> {
    match overrides.and_then(|table| table.get(code)) {
        Some(template) => template.render(params),
        None => interpolate(Cow::Borrowed(default_template(code)), params),
    }
}

/// Replaces `{name}` with the value of param `name`. Unknown placeholders are
/// left as they are.
fn interpolate(template: Cow<'static, str>, params: &ErrorParams) -> Cow<'static, str> {
    if !template.contains('{') {
        return template;
    }

    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template.as_ref();
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let name = &after[..close];
        match params.iter().find(|(k, _)| k.as_ref() == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}
