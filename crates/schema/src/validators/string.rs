//! String schema
//!
//! Type gate, then transforms (trim, lowercase, uppercase, in that order),
//! then the configured checks in a fixed order: formats, lengths, pattern,
//! affixes. Lengths count Unicode scalar values.
//!
//! Checks stop at the first failure unless `abort_early` is explicitly
//! `false`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::{
    ErrorCode, ErrorSink, SchemaError, Validate, ValidationContext, ValidationErrors,
    ValidationResult,
};
use crate::value::Value;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Pure rewrites applied before any check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringTransforms {
    pub trim: bool,
    pub lowercase: bool,
    pub uppercase: bool,
}

impl StringTransforms {
    #[must_use]
    pub fn is_identity(self) -> bool {
        !(self.trim || self.lowercase || self.uppercase)
    }

    pub(crate) fn apply(self, input: &str) -> Cow<'_, str> {
        let mut out = Cow::Borrowed(input);
        if self.trim {
            out = match out {
                Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
                Cow::Owned(s) => Cow::Owned(s.trim().to_owned()),
            };
        }
        if self.lowercase {
            out = Cow::Owned(out.to_lowercase());
        }
        if self.uppercase {
            out = Cow::Owned(out.to_uppercase());
        }
        out
    }
}

/// A single string constraint.
#[derive(Debug, Clone)]
pub enum StringCheck {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Pattern(Regex),
    StartsWith(String),
    EndsWith(String),
    Includes(String),
    Email,
    Url,
    Uuid,
    DateTime,
}

impl StringCheck {
    /// Position in the fixed check order.
    fn rank(&self) -> u8 {
        match self {
            Self::Email => 0,
            Self::Url => 1,
            Self::Uuid => 2,
            Self::DateTime => 3,
            Self::MinLength(_) => 4,
            Self::MaxLength(_) => 5,
            Self::Length(_) => 6,
            Self::Pattern(_) => 7,
            Self::StartsWith(_) => 8,
            Self::EndsWith(_) => 9,
            Self::Includes(_) => 10,
        }
    }

    /// Checks that may appear once; a later call replaces the earlier one.
    fn is_singular(&self) -> bool {
        !matches!(
            self,
            Self::Pattern(_) | Self::StartsWith(_) | Self::EndsWith(_) | Self::Includes(_)
        )
    }

    fn passes(&self, s: &str) -> bool {
        match self {
            Self::MinLength(min) => s.chars().count() >= *min,
            Self::MaxLength(max) => s.chars().count() <= *max,
            Self::Length(len) => s.chars().count() == *len,
            Self::Pattern(re) => re.is_match(s),
            Self::StartsWith(prefix) => s.starts_with(prefix.as_str()),
            Self::EndsWith(suffix) => s.ends_with(suffix.as_str()),
            Self::Includes(needle) => s.contains(needle.as_str()),
            Self::Email => EMAIL_REGEX.is_match(s),
            Self::Url => url::Url::parse(s).is_ok(),
            Self::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
        }
    }

    fn report(&self, s: &str, ctx: &ValidationContext<'_>, sink: &mut ErrorSink) {
        let error = match self {
            Self::MinLength(min) => ctx.error(ErrorCode::StringTooShort, [
                ("min", min.to_string()),
                ("actual", s.chars().count().to_string()),
            ]),
            Self::MaxLength(max) => ctx.error(ErrorCode::StringTooLong, [
                ("max", max.to_string()),
                ("actual", s.chars().count().to_string()),
            ]),
            Self::Length(len) => {
                let actual = s.chars().count();
                if actual < *len {
                    ctx.error(ErrorCode::StringTooShort, [
                        ("min", len.to_string()),
                        ("actual", actual.to_string()),
                    ])
                } else {
                    ctx.error(ErrorCode::StringTooLong, [
                        ("max", len.to_string()),
                        ("actual", actual.to_string()),
                    ])
                }
            }
            Self::Pattern(re) => ctx.error(ErrorCode::StringPatternMismatch, [(
                "pattern",
                re.as_str().to_owned(),
            )]),
            Self::StartsWith(prefix) => ctx.error(ErrorCode::StringInvalidFormat, [
                ("reason", format!("must start with \"{prefix}\"")),
                ("prefix", prefix.clone()),
            ]),
            Self::EndsWith(suffix) => ctx.error(ErrorCode::StringInvalidFormat, [
                ("reason", format!("must end with \"{suffix}\"")),
                ("suffix", suffix.clone()),
            ]),
            Self::Includes(needle) => ctx.error(ErrorCode::StringInvalidFormat, [
                ("reason", format!("must include \"{needle}\"")),
                ("includes", needle.clone()),
            ]),
            Self::Email => ctx.error(ErrorCode::StringInvalidEmail, []),
            Self::Url => ctx.error(ErrorCode::StringInvalidUrl, []),
            Self::Uuid => ctx.error(ErrorCode::StringInvalidUuid, []),
            Self::DateTime => ctx.error(ErrorCode::StringInvalidDatetime, []),
        };
        sink.push(error);
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Builder and validator for strings.
///
/// # Examples
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let username = string().trim().min(3).max(20).try_pattern(r"^[a-z0-9_]+$").unwrap();
/// assert!(username.is(&Value::from("  alice_01 ")));
/// assert!(!username.is(&Value::from("Al")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    transforms: StringTransforms,
    checks: Vec<StringCheck>,
}

impl StringSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_check(mut self, check: StringCheck) -> Self {
        if check.is_singular() {
            let rank = check.rank();
            self.checks.retain(|c| c.rank() != rank);
        }
        let at = self
            .checks
            .iter()
            .position(|c| c.rank() > check.rank())
            .unwrap_or(self.checks.len());
        self.checks.insert(at, check);
        self
    }

    /// At least `min` characters.
    #[must_use = "builder methods must be chained or built"]
    pub fn min(self, min: usize) -> Self {
        self.with_check(StringCheck::MinLength(min))
    }

    /// At most `max` characters.
    #[must_use = "builder methods must be chained or built"]
    pub fn max(self, max: usize) -> Self {
        self.with_check(StringCheck::MaxLength(max))
    }

    /// Exactly `len` characters.
    #[must_use = "builder methods must be chained or built"]
    pub fn length(self, len: usize) -> Self {
        self.with_check(StringCheck::Length(len))
    }

    /// Same as `min(1)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn non_empty(self) -> Self {
        self.min(1)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn pattern(self, pattern: Regex) -> Self {
        self.with_check(StringCheck::Pattern(pattern))
    }

    /// Compiles `pattern` and adds it as a check.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidPattern`] if the regex does not compile.
    pub fn try_pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        Ok(self.pattern(Regex::new(pattern)?))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.with_check(StringCheck::StartsWith(prefix.into()))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.with_check(StringCheck::EndsWith(suffix.into()))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn includes(self, needle: impl Into<String>) -> Self {
        self.with_check(StringCheck::Includes(needle.into()))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn email(self) -> Self {
        self.with_check(StringCheck::Email)
    }

    /// Absolute URL, as accepted by the `url` crate.
    #[must_use = "builder methods must be chained or built"]
    pub fn url(self) -> Self {
        self.with_check(StringCheck::Url)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn uuid(self) -> Self {
        self.with_check(StringCheck::Uuid)
    }

    /// RFC 3339 timestamp with offset.
    #[must_use = "builder methods must be chained or built"]
    pub fn datetime(self) -> Self {
        self.with_check(StringCheck::DateTime)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn trim(mut self) -> Self {
        self.transforms.trim = true;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn lowercase(mut self) -> Self {
        self.transforms.lowercase = true;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn uppercase(mut self) -> Self {
        self.transforms.uppercase = true;
        self
    }

    #[must_use]
    pub fn checks(&self) -> &[StringCheck] {
        &self.checks
    }

    #[must_use]
    pub fn transforms(&self) -> StringTransforms {
        self.transforms
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

pub(crate) fn string_gate<'v>(
    value: &'v Value,
    ctx: &ValidationContext<'_>,
) -> Result<&'v str, ValidationErrors> {
    value.as_str().ok_or_else(|| {
        ctx.error(ErrorCode::NotString, [("received", value.type_name().to_owned())])
            .into()
    })
}

/// Runs `checks` against an already transformed string.
pub(crate) fn run_string_checks(
    checks: &[StringCheck],
    s: &str,
    ctx: &ValidationContext<'_>,
) -> Result<(), ValidationErrors> {
    let mut sink = ErrorSink::new(ctx.fail_fast());
    for check in checks {
        if !check.passes(s) {
            check.report(s, ctx, &mut sink);
            if sink.should_stop() {
                break;
            }
        }
    }
    sink.finish(())
}

pub(crate) fn string_checks_pass(checks: &[StringCheck], s: &str) -> bool {
    checks.iter().all(|check| check.passes(s))
}

/// Full string pipeline over a precomputed configuration.
pub(crate) fn validate_string(
    transforms: StringTransforms,
    checks: &[StringCheck],
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let raw = string_gate(value, ctx)?;
    let s = transforms.apply(raw);
    run_string_checks(checks, &s, ctx)?;
    Ok(match s {
        Cow::Borrowed(b) if b.len() == raw.len() => value.clone(),
        other => Value::String(other.into_owned()),
    })
}

impl Validate for StringSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        validate_string(self.transforms, &self.checks, value, ctx)
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        value
            .as_str()
            .is_some_and(|raw| string_checks_pass(&self.checks, &self.transforms.apply(raw)))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ValidationOptions;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn codes(schema: &StringSchema, input: &str) -> Vec<ErrorCode> {
        schema
            .validate(&Value::from(input))
            .err()
            .map(|e| e.codes())
            .unwrap_or_default()
    }

    #[test]
    fn test_type_gate_single_error() {
        let schema = StringSchema::new().min(3).email();
        let errors = schema.validate(&Value::from(5)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotString]);
        assert_eq!(errors.first().param("received"), Some("number"));
    }

    #[test]
    fn test_collects_all_failures_in_order() {
        let schema = StringSchema::new().starts_with("x").min(10).email();
        let options = ValidationOptions::default().with_abort_early(false);
        let errors = schema.validate_with(&Value::from("abc"), &options).unwrap_err();
        assert_eq!(errors.codes(), vec![
            ErrorCode::StringInvalidEmail,
            ErrorCode::StringTooShort,
            ErrorCode::StringInvalidFormat,
        ]);
    }

    #[test]
    fn test_stops_at_first_failure_by_default() {
        let schema = StringSchema::new().min(10).starts_with("x");
        assert_eq!(codes(&schema, "abc"), vec![ErrorCode::StringTooShort]);
    }

    #[test]
    fn test_format_reported_before_length() {
        let schema = StringSchema::new().min(100).email();
        assert_eq!(codes(&schema, "x"), vec![ErrorCode::StringInvalidEmail]);

        let options = ValidationOptions::default().with_abort_early(true);
        let errors = schema.validate_with(&Value::from("x"), &options).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::StringInvalidEmail]);
    }

    #[test]
    fn test_length_counts_chars() {
        let schema = StringSchema::new().length(3);
        assert!(schema.is(&Value::from("äöü")));
        assert_eq!(codes(&schema, "ab"), vec![ErrorCode::StringTooShort]);
        assert_eq!(codes(&schema, "abcd"), vec![ErrorCode::StringTooLong]);
    }

    #[test]
    fn test_transforms_before_checks() {
        let schema = StringSchema::new().trim().lowercase().max(5);
        assert_eq!(
            schema.validate(&Value::from("  HeLLo  ")).unwrap(),
            Value::from("hello")
        );
        let upper = StringSchema::new().lowercase().uppercase();
        assert_eq!(upper.validate(&Value::from("Ab")).unwrap(), Value::from("AB"));
    }

    #[test]
    fn test_later_bound_replaces_earlier() {
        let schema = StringSchema::new().min(10).min(2);
        assert_eq!(schema.checks().len(), 1);
        assert!(schema.is(&Value::from("ab")));
    }

    #[rstest]
    #[case::email_ok(StringSchema::new().email(), "user@example.com", true)]
    #[case::email_no_tld(StringSchema::new().email(), "user@localhost", false)]
    #[case::email_no_at(StringSchema::new().email(), "invalid", false)]
    #[case::url_ok(StringSchema::new().url(), "https://example.com/a?b=c", true)]
    #[case::url_bad(StringSchema::new().url(), "not a url", false)]
    #[case::uuid_ok(StringSchema::new().uuid(), "67e55044-10b1-426f-9247-bb680e5fe0c8", true)]
    #[case::uuid_bad(StringSchema::new().uuid(), "67e55044", false)]
    #[case::datetime_ok(StringSchema::new().datetime(), "2024-01-15T10:30:00Z", true)]
    #[case::datetime_offset(StringSchema::new().datetime(), "2024-01-15T10:30:00+02:00", true)]
    #[case::datetime_bad(StringSchema::new().datetime(), "2024-01-15", false)]
    #[case::ends_with(StringSchema::new().ends_with(".rs"), "main.rs", true)]
    #[case::includes(StringSchema::new().includes("@"), "no-at", false)]
    fn test_formats(#[case] schema: StringSchema, #[case] input: &str, #[case] valid: bool) {
        assert_eq!(schema.is(&Value::from(input)), valid);
        assert_eq!(schema.validate(&Value::from(input)).is_ok(), valid);
    }

    #[test]
    fn test_pattern_params() {
        let schema = StringSchema::new().try_pattern(r"^\d+$").unwrap();
        let errors = schema.validate(&Value::from("12a")).unwrap_err();
        assert_eq!(errors.first().code, ErrorCode::StringPatternMismatch);
        assert_eq!(errors.first().param("pattern"), Some(r"^\d+$"));
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        assert!(matches!(
            StringSchema::new().try_pattern("("),
            Err(SchemaError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_messages_resolved() {
        let schema = StringSchema::new().min(3);
        let errors = schema.validate(&Value::from("a")).unwrap_err();
        assert_eq!(
            errors.first().message,
            "String must contain at least 3 character(s)"
        );
    }
}
