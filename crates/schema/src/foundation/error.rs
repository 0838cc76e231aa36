//! Error types for validation failures
//!
//! Validation failures are ordinary values: every validator returns
//! [`ValidationResult`](crate::foundation::ValidationResult), whose error side
//! is a [`ValidationErrors`] list that is never empty. Exceptions in the
//! "throw on invalid" sense only exist at the [`ParseError`] boundary.
//!
//! Codes and default messages use `Cow<'static, str>` so the common case of a
//! template without placeholders allocates nothing.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// ERROR CODES
// ============================================================================

/// Enumerated kind of a validation failure.
///
/// Rendered in `SCREAMING_SNAKE_CASE` (`NOT_STRING`, `UNION_NO_MATCH`, ...)
/// both by [`ErrorCode::as_str`] and by serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // type gates
    NotString,
    NotNumber,
    NotBoolean,
    NotDate,
    NotNull,
    NotObject,
    NotArray,
    NotMap,
    NotSet,
    // string constraints
    StringTooShort,
    StringTooLong,
    StringPatternMismatch,
    StringInvalidFormat,
    StringInvalidEmail,
    StringInvalidUrl,
    StringInvalidUuid,
    StringInvalidDatetime,
    // number constraints
    NumberNotFinite,
    NumberNotInteger,
    NumberNotSafeInteger,
    NumberTooSmall,
    NumberTooBig,
    NumberNotPositive,
    NumberNotNegative,
    NumberNotMultipleOf,
    // dates
    DateTooEarly,
    DateTooLate,
    // literal / enum
    LiteralMismatch,
    EnumMismatch,
    // collections
    ArrayTooShort,
    ArrayTooLong,
    ArrayNotUnique,
    SetTooSmall,
    SetTooBig,
    // structure
    ObjectUnknownKey,
    ObjectMissingKey,
    ObjectForbiddenKey,
    ObjectDuplicateKey,
    UnionNoMatch,
    IntersectionConflict,
    // behavioral
    RefinementFailed,
    TransformFailed,
    CustomValidation,
    AsyncRequired,
    // guards
    MaxDepthExceeded,
    Never,
    UnknownError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::NotString,
        Self::NotNumber,
        Self::NotBoolean,
        Self::NotDate,
        Self::NotNull,
        Self::NotObject,
        Self::NotArray,
        Self::NotMap,
        Self::NotSet,
        Self::StringTooShort,
        Self::StringTooLong,
        Self::StringPatternMismatch,
        Self::StringInvalidFormat,
        Self::StringInvalidEmail,
        Self::StringInvalidUrl,
        Self::StringInvalidUuid,
        Self::StringInvalidDatetime,
        Self::NumberNotFinite,
        Self::NumberNotInteger,
        Self::NumberNotSafeInteger,
        Self::NumberTooSmall,
        Self::NumberTooBig,
        Self::NumberNotPositive,
        Self::NumberNotNegative,
        Self::NumberNotMultipleOf,
        Self::DateTooEarly,
        Self::DateTooLate,
        Self::LiteralMismatch,
        Self::EnumMismatch,
        Self::ArrayTooShort,
        Self::ArrayTooLong,
        Self::ArrayNotUnique,
        Self::SetTooSmall,
        Self::SetTooBig,
        Self::ObjectUnknownKey,
        Self::ObjectMissingKey,
        Self::ObjectForbiddenKey,
        Self::ObjectDuplicateKey,
        Self::UnionNoMatch,
        Self::IntersectionConflict,
        Self::RefinementFailed,
        Self::TransformFailed,
        Self::CustomValidation,
        Self::AsyncRequired,
        Self::MaxDepthExceeded,
        Self::Never,
        Self::UnknownError,
    ];

    /// The wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotString => "NOT_STRING",
            Self::NotNumber => "NOT_NUMBER",
            Self::NotBoolean => "NOT_BOOLEAN",
            Self::NotDate => "NOT_DATE",
            Self::NotNull => "NOT_NULL",
            Self::NotObject => "NOT_OBJECT",
            Self::NotArray => "NOT_ARRAY",
            Self::NotMap => "NOT_MAP",
            Self::NotSet => "NOT_SET",
            Self::StringTooShort => "STRING_TOO_SHORT",
            Self::StringTooLong => "STRING_TOO_LONG",
            Self::StringPatternMismatch => "STRING_PATTERN_MISMATCH",
            Self::StringInvalidFormat => "STRING_INVALID_FORMAT",
            Self::StringInvalidEmail => "STRING_INVALID_EMAIL",
            Self::StringInvalidUrl => "STRING_INVALID_URL",
            Self::StringInvalidUuid => "STRING_INVALID_UUID",
            Self::StringInvalidDatetime => "STRING_INVALID_DATETIME",
            Self::NumberNotFinite => "NUMBER_NOT_FINITE",
            Self::NumberNotInteger => "NUMBER_NOT_INTEGER",
            Self::NumberNotSafeInteger => "NUMBER_NOT_SAFE_INTEGER",
            Self::NumberTooSmall => "NUMBER_TOO_SMALL",
            Self::NumberTooBig => "NUMBER_TOO_BIG",
            Self::NumberNotPositive => "NUMBER_NOT_POSITIVE",
            Self::NumberNotNegative => "NUMBER_NOT_NEGATIVE",
            Self::NumberNotMultipleOf => "NUMBER_NOT_MULTIPLE_OF",
            Self::DateTooEarly => "DATE_TOO_EARLY",
            Self::DateTooLate => "DATE_TOO_LATE",
            Self::LiteralMismatch => "LITERAL_MISMATCH",
            Self::EnumMismatch => "ENUM_MISMATCH",
            Self::ArrayTooShort => "ARRAY_TOO_SHORT",
            Self::ArrayTooLong => "ARRAY_TOO_LONG",
            Self::ArrayNotUnique => "ARRAY_NOT_UNIQUE",
            Self::SetTooSmall => "SET_TOO_SMALL",
            Self::SetTooBig => "SET_TOO_BIG",
            Self::ObjectUnknownKey => "OBJECT_UNKNOWN_KEY",
            Self::ObjectMissingKey => "OBJECT_MISSING_KEY",
            Self::ObjectForbiddenKey => "OBJECT_FORBIDDEN_KEY",
            Self::ObjectDuplicateKey => "OBJECT_DUPLICATE_KEY",
            Self::UnionNoMatch => "UNION_NO_MATCH",
            Self::IntersectionConflict => "INTERSECTION_CONFLICT",
            Self::RefinementFailed => "REFINEMENT_FAILED",
            Self::TransformFailed => "TRANSFORM_FAILED",
            Self::CustomValidation => "CUSTOM_VALIDATION",
            Self::AsyncRequired => "ASYNC_REQUIRED",
            Self::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
            Self::Never => "NEVER",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Interpolation parameters attached to an error (`min`, `received`, ...).
///
/// Typically 0-3 entries, so they live inline.
pub type ErrorParams = SmallVec<[(Cow<'static, str>, String); 4]>;

/// A structured validation error.
///
/// # Examples
///
/// ```
/// use nebula_schema::{ErrorCode, ValidationError};
///
/// let error = ValidationError::new(ErrorCode::StringTooShort, "Too short")
///     .with_path("user.name")
///     .with_param("min", "3");
///
/// assert_eq!(error.param("min"), Some("3"));
/// assert_eq!(error.to_string(), "[user.name] STRING_TOO_SHORT: Too short (params: [min=3])");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Error kind for programmatic handling and i18n.
    pub code: ErrorCode,

    /// Human-readable message, resolved from the message table.
    pub message: Cow<'static, str>,

    /// Location in the validated value (`address.street`, `items[2].id`).
    ///
    /// Empty for the root value.
    pub path: String,

    /// Parameters used for message interpolation.
    #[serde(serialize_with = "serialize_params")]
    pub params: ErrorParams,

    /// Per-alternative error groups, used by `UNION_NO_MATCH`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ValidationErrors>,
}

impl ValidationError {
    /// Creates a new validation error at the root path.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            path: String::new(),
            params: ErrorParams::new(),
            nested: Vec::new(),
        }
    }

    /// Sets the path of this error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Replaces the message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Adds a parameter to the error.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Attaches per-alternative error groups.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_nested(mut self, groups: Vec<ValidationErrors>) -> Self {
        self.nested = groups;
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of errors, counting nested groups.
    #[must_use]
    pub fn total_error_count(&self) -> usize {
        1 + self
            .nested
            .iter()
            .flat_map(ValidationErrors::iter)
            .map(Self::total_error_count)
            .sum::<usize>()
    }
}

fn serialize_params<S: serde::Serializer>(
    params: &ErrorParams,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(params.len()))?;
    for (k, v) in params {
        map.serialize_entry(k.as_ref(), v)?;
    }
    map.end()
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)?;
        } else {
            write!(f, "[{}] {}: {}", self.path, self.code, self.message)?;
        }

        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "])")?;
        }

        for (i, group) in self.nested.iter().enumerate() {
            write!(f, "\n  option {}:", i + 1)?;
            for error in group {
                write!(f, "\n    - {error}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ERROR COLLECTION
// ============================================================================

/// A non-empty list of validation errors.
///
/// There is no way to build an empty list, so a failed validation always
/// carries at least one error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

#[allow(clippy::len_without_is_empty)] // never empty
impl ValidationErrors {
    /// Creates a list holding one error.
    #[must_use]
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Wraps a vector, or returns `None` when it is empty.
    #[must_use]
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Adds an error.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Moves every error of `other` to the end of this list.
    pub fn append(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Number of top-level errors (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first error.
    #[must_use]
    pub fn first(&self) -> &ValidationError {
        &self.errors[0]
    }

    /// All errors, in the order they were reported.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ValidationError> {
        self.errors.iter_mut()
    }

    /// Error codes, in report order.
    #[must_use]
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// Error paths, in report order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Accumulates errors while a composite validator walks its children.
///
/// Stops accepting more work (see [`ErrorSink::should_stop`]) once an error
/// is recorded and the run is in abort-early mode.
#[derive(Debug)]
pub(crate) struct ErrorSink {
    errors: Option<ValidationErrors>,
    abort_early: bool,
}

impl ErrorSink {
    pub(crate) fn new(abort_early: bool) -> Self {
        Self {
            errors: None,
            abort_early,
        }
    }

    pub(crate) fn push(&mut self, error: ValidationError) {
        match &mut self.errors {
            Some(errors) => errors.push(error),
            None => self.errors = Some(ValidationErrors::single(error)),
        }
    }

    pub(crate) fn append(&mut self, other: ValidationErrors) {
        match &mut self.errors {
            Some(errors) => errors.append(other),
            None => self.errors = Some(other),
        }
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.abort_early && self.errors.is_some()
    }

    /// `Ok(value)` if nothing was recorded.
    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(value),
        }
    }
}

// ============================================================================
// BOUNDARY ERRORS
// ============================================================================

/// Error raised by the throwing entry points (`parse`, `assert_valid`,
/// `parse_as`).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The value failed validation. Carries the full error list.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// The value passed validation but does not fit the requested Rust type.
    #[error("validated value does not fit the target type: {0}")]
    Deserialize(String),
}

impl ParseError {
    /// The validation errors, when this is a validation failure.
    #[must_use]
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Deserialize(_) => None,
        }
    }
}

impl From<ValidationErrors> for ParseError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

/// Programmer error detected while building a schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("intersection needs at least two members, got {0}")]
    IntersectionArity(usize),

    #[error("union needs at least one option")]
    EmptyUnion,

    #[error("enumeration needs at least one value")]
    EmptyEnum,

    #[error("discriminated union option {index} is not an object schema")]
    DiscriminatorNotObject { index: usize },

    #[error("discriminated union option {index} has no literal value for `{key}`")]
    MissingDiscriminator { index: usize, key: String },

    #[error("discriminator value {value} is used by more than one option")]
    DuplicateDiscriminator { value: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

impl From<regex::Error> for SchemaError {
    fn from(error: regex::Error) -> Self {
        Self::InvalidPattern(error.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
