//! Number schema
//!
//! `NaN` fails the type gate. Checks run in a fixed order: finite, integer,
//! safe integer, lower bound, upper bound, sign, multiple-of.

use crate::foundation::{
    ErrorCode, ErrorSink, Validate, ValidationContext, ValidationErrors, ValidationResult,
};
use crate::value::{Value, format_number};

/// Largest integer `f64` represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Sign requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
    NonNegative,
    NonPositive,
}

impl Sign {
    fn holds(self, n: f64) -> bool {
        match self {
            Self::Positive => n > 0.0,
            Self::Negative => n < 0.0,
            Self::NonNegative => n >= 0.0,
            Self::NonPositive => n <= 0.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::NonNegative => "non-negative",
            Self::NonPositive => "non-positive",
        }
    }
}

/// A single numeric constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberCheck {
    Finite,
    Int,
    SafeInt,
    Min { value: f64, inclusive: bool },
    Max { value: f64, inclusive: bool },
    Sign(Sign),
    MultipleOf(f64),
}

impl NumberCheck {
    fn rank(self) -> u8 {
        match self {
            Self::Finite => 0,
            Self::Int => 1,
            Self::SafeInt => 2,
            Self::Min { .. } => 3,
            Self::Max { .. } => 4,
            Self::Sign(_) => 5,
            Self::MultipleOf(_) => 6,
        }
    }

    fn passes(self, n: f64) -> bool {
        match self {
            Self::Finite => n.is_finite(),
            Self::Int => n.is_finite() && n.fract() == 0.0,
            Self::SafeInt => n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER,
            Self::Min { value, inclusive } => {
                if inclusive {
                    n >= value
                } else {
                    n > value
                }
            }
            Self::Max { value, inclusive } => {
                if inclusive {
                    n <= value
                } else {
                    n < value
                }
            }
            Self::Sign(sign) => sign.holds(n),
            // plain remainder, no tolerance: 0.3 is not a multiple of 0.1
            Self::MultipleOf(m) => n % m == 0.0,
        }
    }

    fn report(self, n: f64, ctx: &ValidationContext<'_>) -> crate::foundation::ValidationError {
        let received = format_number(n);
        match self {
            Self::Finite => ctx.error(ErrorCode::NumberNotFinite, [("received", received)]),
            Self::Int => ctx.error(ErrorCode::NumberNotInteger, [("received", received)]),
            Self::SafeInt => ctx.error(ErrorCode::NumberNotSafeInteger, [("received", received)]),
            Self::Min { value, inclusive } => ctx.error(ErrorCode::NumberTooSmall, [
                ("min", format_number(value)),
                ("inclusive", inclusive.to_string()),
                (
                    "comparison",
                    if inclusive {
                        "greater than or equal to"
                    } else {
                        "greater than"
                    }
                    .to_owned(),
                ),
                ("received", received),
            ]),
            Self::Max { value, inclusive } => ctx.error(ErrorCode::NumberTooBig, [
                ("max", format_number(value)),
                ("inclusive", inclusive.to_string()),
                (
                    "comparison",
                    if inclusive {
                        "less than or equal to"
                    } else {
                        "less than"
                    }
                    .to_owned(),
                ),
                ("received", received),
            ]),
            Self::Sign(sign) => {
                let code = match sign {
                    Sign::Positive | Sign::NonNegative => ErrorCode::NumberNotPositive,
                    Sign::Negative | Sign::NonPositive => ErrorCode::NumberNotNegative,
                };
                ctx.error(code, [
                    ("expected", sign.label().to_owned()),
                    ("received", received),
                ])
            }
            Self::MultipleOf(m) => ctx.error(ErrorCode::NumberNotMultipleOf, [
                ("multiple", format_number(m)),
                ("received", received),
            ]),
        }
    }
}

/// Builder and validator for numbers.
///
/// ```
/// use nebula_schema::prelude::*;
///
/// let port = number().int().gte(1.0).lte(65535.0);
/// assert!(port.is(&Value::from(8080)));
/// assert!(!port.is(&Value::from(0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    checks: Vec<NumberCheck>,
}

impl NumberSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_check(mut self, check: NumberCheck) -> Self {
        let rank = check.rank();
        self.checks.retain(|c| c.rank() != rank);
        let at = self
            .checks
            .iter()
            .position(|c| c.rank() > rank)
            .unwrap_or(self.checks.len());
        self.checks.insert(at, check);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn finite(self) -> Self {
        self.with_check(NumberCheck::Finite)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn int(self) -> Self {
        self.with_check(NumberCheck::Int)
    }

    /// Integer within ±(2^53 - 1).
    #[must_use = "builder methods must be chained or built"]
    pub fn safe(self) -> Self {
        self.with_check(NumberCheck::SafeInt)
    }

    /// Same as [`gte`](Self::gte).
    #[must_use = "builder methods must be chained or built"]
    pub fn min(self, value: f64) -> Self {
        self.gte(value)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn gte(self, value: f64) -> Self {
        self.with_check(NumberCheck::Min {
            value,
            inclusive: true,
        })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn gt(self, value: f64) -> Self {
        self.with_check(NumberCheck::Min {
            value,
            inclusive: false,
        })
    }

    /// Same as [`lte`](Self::lte).
    #[must_use = "builder methods must be chained or built"]
    pub fn max(self, value: f64) -> Self {
        self.lte(value)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn lte(self, value: f64) -> Self {
        self.with_check(NumberCheck::Max {
            value,
            inclusive: true,
        })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn lt(self, value: f64) -> Self {
        self.with_check(NumberCheck::Max {
            value,
            inclusive: false,
        })
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn positive(self) -> Self {
        self.with_check(NumberCheck::Sign(Sign::Positive))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn negative(self) -> Self {
        self.with_check(NumberCheck::Sign(Sign::Negative))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn nonnegative(self) -> Self {
        self.with_check(NumberCheck::Sign(Sign::NonNegative))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn nonpositive(self) -> Self {
        self.with_check(NumberCheck::Sign(Sign::NonPositive))
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn multiple_of(self, step: f64) -> Self {
        self.with_check(NumberCheck::MultipleOf(step))
    }

    #[must_use]
    pub fn checks(&self) -> &[NumberCheck] {
        &self.checks
    }
}

pub(crate) fn number_gate(value: &Value, ctx: &ValidationContext<'_>) -> Result<f64, ValidationErrors> {
    match value {
        Value::Number(n) if !n.is_nan() => Ok(*n),
        other => Err(ctx
            .error(ErrorCode::NotNumber, [("received", other.type_name().to_owned())])
            .into()),
    }
}

pub(crate) fn run_number_checks(
    checks: &[NumberCheck],
    n: f64,
    ctx: &ValidationContext<'_>,
) -> Result<(), ValidationErrors> {
    let mut sink = ErrorSink::new(ctx.fail_fast());
    for check in checks {
        if !check.passes(n) {
            sink.push(check.report(n, ctx));
            if sink.should_stop() {
                break;
            }
        }
    }
    sink.finish(())
}

pub(crate) fn number_checks_pass(checks: &[NumberCheck], value: &Value) -> bool {
    matches!(value, Value::Number(n) if !n.is_nan() && checks.iter().all(|c| c.passes(*n)))
}

impl Validate for NumberSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        let n = number_gate(value, ctx)?;
        run_number_checks(&self.checks, n, ctx)?;
        Ok(value.clone())
    }

    fn check_in(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        number_checks_pass(&self.checks, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ValidationOptions;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn codes(schema: &NumberSchema, n: f64) -> Vec<ErrorCode> {
        schema
            .validate(&Value::from(n))
            .err()
            .map(|e| e.codes())
            .unwrap_or_default()
    }

    #[test]
    fn test_nan_is_type_error() {
        let errors = NumberSchema::new().validate(&Value::Number(f64::NAN)).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::NotNumber]);
        assert_eq!(errors.first().param("received"), Some("nan"));
    }

    #[test]
    fn test_infinity_passes_plain_schema() {
        assert!(NumberSchema::new().is(&Value::Number(f64::INFINITY)));
        assert_eq!(
            codes(&NumberSchema::new().finite(), f64::INFINITY),
            vec![ErrorCode::NumberNotFinite]
        );
    }

    #[rstest]
    #[case(NumberSchema::new().int(), 1.5, vec![ErrorCode::NumberNotInteger])]
    #[case(NumberSchema::new().safe(), 9_007_199_254_740_992.0, vec![ErrorCode::NumberNotSafeInteger])]
    #[case(NumberSchema::new().gte(5.0), 5.0, vec![])]
    #[case(NumberSchema::new().gt(5.0), 5.0, vec![ErrorCode::NumberTooSmall])]
    #[case(NumberSchema::new().lte(5.0), 5.0, vec![])]
    #[case(NumberSchema::new().lt(5.0), 5.0, vec![ErrorCode::NumberTooBig])]
    #[case(NumberSchema::new().positive(), 0.0, vec![ErrorCode::NumberNotPositive])]
    #[case(NumberSchema::new().nonnegative(), 0.0, vec![])]
    #[case(NumberSchema::new().nonnegative(), -1.0, vec![ErrorCode::NumberNotPositive])]
    #[case(NumberSchema::new().negative(), 0.0, vec![ErrorCode::NumberNotNegative])]
    #[case(NumberSchema::new().nonpositive(), 1.0, vec![ErrorCode::NumberNotNegative])]
    #[case(NumberSchema::new().multiple_of(5.0), 15.0, vec![])]
    #[case(NumberSchema::new().multiple_of(5.0), 12.0, vec![ErrorCode::NumberNotMultipleOf])]
    fn test_checks(#[case] schema: NumberSchema, #[case] n: f64, #[case] expected: Vec<ErrorCode>) {
        assert_eq!(codes(&schema, n), expected);
        assert_eq!(schema.is(&Value::from(n)), expected.is_empty());
    }

    #[test]
    fn test_multiple_of_has_no_tolerance() {
        // 0.3 % 0.1 is not exactly zero in binary floating point
        assert!(!NumberSchema::new().multiple_of(0.1).is(&Value::from(0.3)));
    }

    #[test]
    fn test_fixed_order_regardless_of_builder_order() {
        let schema = NumberSchema::new().multiple_of(2.0).gte(10.0).int();
        let options = ValidationOptions::default().with_abort_early(false);
        let errors = schema.validate_with(&Value::from(3.5), &options).unwrap_err();
        assert_eq!(errors.codes(), vec![
            ErrorCode::NumberNotInteger,
            ErrorCode::NumberTooSmall,
            ErrorCode::NumberNotMultipleOf,
        ]);
        assert_eq!(codes(&schema, 3.5), vec![ErrorCode::NumberNotInteger]);
    }

    #[test]
    fn test_bound_message() {
        let errors = NumberSchema::new().gt(0.0).validate(&Value::from(0)).unwrap_err();
        assert_eq!(errors.first().message, "Number must be greater than 0");
    }
}
