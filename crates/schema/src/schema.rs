//! Schema handle, node kinds, factory functions and the modifier trait.
//!
//! A [`Schema`] is an immutable, cheaply clonable handle to one node of a
//! schema tree. Builders such as [`StringSchema`] or [`ObjectSchema`] are
//! plain values; they turn into a `Schema` through `From`/`Into` wherever a
//! child schema is expected, so call sites rarely convert by hand:
//!
//! ```
//! use nebula_schema::prelude::*;
//! use serde_json::json;
//!
//! let user = object()
//!     .field("name", string().min(1))
//!     .field("email", string().email())
//!     .field("tags", string().array().max(5))
//!     .field("role", enumeration(["admin", "member"]).unwrap().default("member"));
//!
//! let out = user
//!     .validate(&json!({"name": "alice", "email": "a@example.com", "tags": []}).into())
//!     .unwrap();
//! assert_eq!(out.get("role"), Some(&Value::from("member")));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::combinators::{
    Absence, ArraySchema, AsyncRefineSchema, CustomSchema, DefaultSchema, DefaultValue,
    DiscriminatedUnionSchema, IntersectionSchema, LazySchema, MapSchema, ObjectSchema,
    OptionalSchema, PipeSchema, PreprocessSchema, RecordSchema, RefineOutcome, RefineSchema,
    SetSchema, TransformSchema, TupleSchema, UnionSchema, WithMessage,
};
use crate::compiler::CompiledValidator;
use crate::foundation::{
    ParseError, SchemaError, Validate, ValidationContext, ValidationOptions, ValidationResult,
};
use crate::validators::{
    AnySchema, BooleanSchema, DateSchema, EnumSchema, LiteralSchema, NeverSchema, NullSchema,
    NumberSchema, StringSchema,
};
use crate::value::Value;

// ============================================================================
// NODE KINDS
// ============================================================================

/// A user validator embedded in a schema tree.
#[derive(Clone)]
pub struct ValidatorSchema(Arc<dyn Validate>);

impl ValidatorSchema {
    pub fn new(validator: impl Validate + 'static) -> Self {
        Self(Arc::new(validator))
    }
}

impl Validate for ValidatorSchema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.0.validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.0.check_in(value, ctx)
    }
}

impl fmt::Debug for ValidatorSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorSchema(<dyn Validate>)")
    }
}

/// The configuration record of one schema node.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SchemaKind {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Null(NullSchema),
    Literal(LiteralSchema),
    Enum(EnumSchema),
    Any(AnySchema),
    Never(NeverSchema),
    Object(ObjectSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Union(UnionSchema),
    DiscriminatedUnion(DiscriminatedUnionSchema),
    Intersection(IntersectionSchema),
    Record(RecordSchema),
    Map(MapSchema),
    Set(SetSchema),
    Lazy(LazySchema),
    Optional(OptionalSchema),
    Default(DefaultSchema),
    Refine(RefineSchema),
    RefineAsync(AsyncRefineSchema),
    Custom(CustomSchema),
    Transform(TransformSchema),
    Preprocess(PreprocessSchema),
    Pipe(PipeSchema),
    Message(WithMessage),
    Validator(ValidatorSchema),
}

impl SchemaKind {
    /// Short lowercase name of the node kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Null(_) => "null",
            Self::Literal(_) => "literal",
            Self::Enum(_) => "enum",
            Self::Any(_) => "any",
            Self::Never(_) => "never",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::Union(_) => "union",
            Self::DiscriminatedUnion(_) => "discriminated_union",
            Self::Intersection(_) => "intersection",
            Self::Record(_) => "record",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
            Self::Lazy(_) => "lazy",
            Self::Optional(_) => "optional",
            Self::Default(_) => "default",
            Self::Refine(_) => "refine",
            Self::RefineAsync(_) => "refine_async",
            Self::Custom(_) => "custom",
            Self::Transform(_) => "transform",
            Self::Preprocess(_) => "preprocess",
            Self::Pipe(_) => "pipe",
            Self::Message(_) => "message",
            Self::Validator(_) => "validator",
        }
    }
}

// ============================================================================
// SCHEMA HANDLE
// ============================================================================

#[derive(Debug, Clone)]
struct SchemaNode {
    kind: SchemaKind,
    description: Option<Cow<'static, str>>,
}

/// Shared handle to an immutable schema node.
#[derive(Debug, Clone)]
pub struct Schema(Arc<SchemaNode>);

impl Schema {
    #[must_use]
    pub fn new(kind: SchemaKind) -> Self {
        Self(Arc::new(SchemaNode {
            kind,
            description: None,
        }))
    }

    #[must_use]
    pub fn kind(&self) -> &SchemaKind {
        &self.0.kind
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.0.kind.name()
    }

    /// Text attached with [`SchemaExt::describe`].
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        Arc::make_mut(&mut self.0).description = Some(description.into());
        self
    }

    /// Compiles this schema into a closure tree bound to `options`.
    #[must_use]
    pub fn compile(&self, options: ValidationOptions) -> CompiledValidator {
        crate::compiler::compile(self, options)
    }

    /// Validates, awaiting async refinements.
    ///
    /// # Errors
    ///
    /// Every validation failure, as with [`Validate::validate_with`].
    pub async fn validate_async(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let ctx = ValidationContext::root(options);
        crate::asynchronous::validate_node(self, value, &ctx).await
    }

    /// Validates, then deserializes the output into `T`.
    ///
    /// # Errors
    ///
    /// [`ParseError::Invalid`] on validation failure,
    /// [`ParseError::Deserialize`] when the output does not fit `T`.
    pub fn parse_as<T: DeserializeOwned>(&self, value: &Value) -> Result<T, ParseError> {
        let out = self.parse(value)?;
        serde_json::from_value(out.to_json()).map_err(|e| ParseError::Deserialize(e.to_string()))
    }

    pub(crate) fn as_validate(&self) -> &dyn Validate {
        match self.kind() {
            SchemaKind::String(s) => s,
            SchemaKind::Number(s) => s,
            SchemaKind::Boolean(s) => s,
            SchemaKind::Date(s) => s,
            SchemaKind::Null(s) => s,
            SchemaKind::Literal(s) => s,
            SchemaKind::Enum(s) => s,
            SchemaKind::Any(s) => s,
            SchemaKind::Never(s) => s,
            SchemaKind::Object(s) => s,
            SchemaKind::Array(s) => s,
            SchemaKind::Tuple(s) => s,
            SchemaKind::Union(s) => s,
            SchemaKind::DiscriminatedUnion(s) => s,
            SchemaKind::Intersection(s) => s,
            SchemaKind::Record(s) => s,
            SchemaKind::Map(s) => s,
            SchemaKind::Set(s) => s,
            SchemaKind::Lazy(s) => s,
            SchemaKind::Optional(s) => s,
            SchemaKind::Default(s) => s,
            SchemaKind::Refine(s) => s,
            SchemaKind::RefineAsync(s) => s,
            SchemaKind::Custom(s) => s,
            SchemaKind::Transform(s) => s,
            SchemaKind::Preprocess(s) => s,
            SchemaKind::Pipe(s) => s,
            SchemaKind::Message(s) => s,
            SchemaKind::Validator(s) => s,
        }
    }
}

impl Validate for Schema {
    fn validate_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> ValidationResult {
        self.as_validate().validate_in(value, ctx)
    }

    fn check_in(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        self.as_validate().check_in(value, ctx)
    }
}

macro_rules! impl_into_schema {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Schema {
                fn from(node: $ty) -> Self {
                    Self::new(SchemaKind::$variant(node))
                }
            }
        )*
    };
}

impl_into_schema! {
    StringSchema => String,
    NumberSchema => Number,
    BooleanSchema => Boolean,
    DateSchema => Date,
    NullSchema => Null,
    LiteralSchema => Literal,
    EnumSchema => Enum,
    AnySchema => Any,
    NeverSchema => Never,
    ObjectSchema => Object,
    ArraySchema => Array,
    TupleSchema => Tuple,
    UnionSchema => Union,
    DiscriminatedUnionSchema => DiscriminatedUnion,
    IntersectionSchema => Intersection,
    RecordSchema => Record,
    MapSchema => Map,
    SetSchema => Set,
    LazySchema => Lazy,
    OptionalSchema => Optional,
    DefaultSchema => Default,
    RefineSchema => Refine,
    AsyncRefineSchema => RefineAsync,
    CustomSchema => Custom,
    TransformSchema => Transform,
    PreprocessSchema => Preprocess,
    PipeSchema => Pipe,
    WithMessage => Message,
    ValidatorSchema => Validator,
}

// ============================================================================
// FACTORIES
// ============================================================================

#[must_use]
pub fn string() -> StringSchema {
    StringSchema::new()
}

#[must_use]
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

#[must_use]
pub fn boolean() -> BooleanSchema {
    BooleanSchema
}

#[must_use]
pub fn date() -> DateSchema {
    DateSchema::new()
}

#[must_use]
pub fn null() -> NullSchema {
    NullSchema
}

/// Exactly `value`, compared by deep equality.
pub fn literal(value: impl Into<Value>) -> Schema {
    LiteralSchema::new(value).into()
}

/// One of `values`.
///
/// # Errors
///
/// [`SchemaError::EmptyEnum`] when `values` is empty.
pub fn enumeration<I, V>(values: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    EnumSchema::new(values).map(Schema::from)
}

#[must_use]
pub fn any() -> AnySchema {
    AnySchema
}

/// Same as [`any`].
#[must_use]
pub fn unknown() -> AnySchema {
    AnySchema
}

#[must_use]
pub fn never() -> NeverSchema {
    NeverSchema
}

#[must_use]
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

pub fn array(element: impl Into<Schema>) -> ArraySchema {
    ArraySchema::new(element)
}

pub fn tuple<I>(positions: I) -> TupleSchema
where
    I: IntoIterator<Item = Schema>,
{
    TupleSchema::new(positions)
}

/// First matching option wins.
///
/// # Errors
///
/// [`SchemaError::EmptyUnion`] without options.
pub fn union<I>(options: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = Schema>,
{
    UnionSchema::new(options).map(Schema::from)
}

/// Union dispatched on the value of `key`.
///
/// # Errors
///
/// See [`DiscriminatedUnionSchema::new`].
pub fn discriminated_union<I>(key: impl Into<String>, options: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = Schema>,
{
    DiscriminatedUnionSchema::new(key, options).map(Schema::from)
}

/// Every member must pass.
///
/// # Errors
///
/// [`SchemaError::IntersectionArity`] with fewer than two members.
pub fn intersection<I>(members: I) -> Result<Schema, SchemaError>
where
    I: IntoIterator<Item = Schema>,
{
    IntersectionSchema::new(members).map(Schema::from)
}

pub fn record(value: impl Into<Schema>) -> RecordSchema {
    RecordSchema::new(value)
}

pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> MapSchema {
    MapSchema::new(key, value)
}

pub fn set(element: impl Into<Schema>) -> SetSchema {
    SetSchema::new(element)
}

pub fn lazy<F>(getter: F) -> LazySchema
where
    F: Fn() -> Schema + Send + Sync + 'static,
{
    LazySchema::new(getter)
}

pub fn custom<F, R>(predicate: F, message: impl Into<Cow<'static, str>>) -> CustomSchema
where
    F: Fn(&Value) -> R + Send + Sync + 'static,
    R: RefineOutcome,
{
    CustomSchema::new(predicate, message)
}

pub fn preprocess<F, E>(preprocess: F, inner: impl Into<Schema>) -> PreprocessSchema
where
    F: Fn(&Value) -> Result<Value, E> + Send + Sync + 'static,
    E: fmt::Display,
{
    PreprocessSchema::new(preprocess, inner.into())
}

/// Embeds a hand-written [`Validate`] implementation.
pub fn from_validator(validator: impl Validate + 'static) -> Schema {
    ValidatorSchema::new(validator).into()
}

// ============================================================================
// MODIFIERS
// ============================================================================

/// Wrapping modifiers, available on every schema and builder.
pub trait SchemaExt: Into<Schema> + Sized {
    /// `Undefined` passes unchanged.
    fn optional(self) -> Schema {
        OptionalSchema::new(self.into(), Absence::Undefined).into()
    }

    /// `Null` passes unchanged.
    fn nullable(self) -> Schema {
        OptionalSchema::new(self.into(), Absence::Null).into()
    }

    /// `Undefined` and `Null` pass unchanged.
    fn nullish(self) -> Schema {
        OptionalSchema::new(self.into(), Absence::Either).into()
    }

    /// `Undefined` is replaced with `value` before validation.
    fn default(self, value: impl Into<Value>) -> Schema {
        DefaultSchema::new(self.into(), DefaultValue::Value(value.into())).into()
    }

    /// Like [`default`](Self::default), calling `make` for each use.
    fn default_with<F>(self, make: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultSchema::new(self.into(), DefaultValue::With(Arc::new(make))).into()
    }

    /// `predicate` returns `bool`, or `Result<bool, E>` when it can fail.
    fn refine<F, R>(self, predicate: F, message: impl Into<Cow<'static, str>>) -> Schema
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: RefineOutcome,
    {
        RefineSchema::new(self.into(), predicate, message).into()
    }

    fn refine_async<F, Fut>(self, predicate: F, message: impl Into<Cow<'static, str>>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: RefineOutcome,
    {
        AsyncRefineSchema::new(self.into(), predicate, message).into()
    }

    fn transform<F, E>(self, transform: F) -> Schema
    where
        F: Fn(Value) -> Result<Value, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        TransformSchema::new(self.into(), transform).into()
    }

    /// Feeds this schema's output into `next`.
    fn pipe(self, next: impl Into<Schema>) -> Schema {
        PipeSchema::new(self.into(), next.into()).into()
    }

    /// Two-member intersection.
    fn and(self, other: impl Into<Schema>) -> Schema {
        IntersectionSchema::pair(self.into(), other.into()).into()
    }

    /// Two-member union.
    fn or(self, other: impl Into<Schema>) -> Schema {
        UnionSchema::non_empty(self.into(), [other.into()]).into()
    }

    /// Replaces the message of errors reported at this node.
    fn message(self, message: impl Into<Cow<'static, str>>) -> Schema {
        WithMessage::new(self.into(), message).into()
    }

    fn describe(self, description: impl Into<Cow<'static, str>>) -> Schema {
        self.into().with_description(description)
    }

    /// Array of this schema.
    fn array(self) -> ArraySchema {
        ArraySchema::new(self)
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::ErrorCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_schema_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
        assert_send_sync::<SchemaKind>();
    }

    #[rstest]
    #[case::string(string().into(), "string")]
    #[case::literal(literal(1), "literal")]
    #[case::optional(number().optional(), "optional")]
    #[case::union(string().or(number()), "union")]
    #[case::intersection(any().and(any()), "intersection")]
    #[case::array(boolean().array().into(), "array")]
    #[case::validator(from_validator(AnySchema), "validator")]
    fn test_kind_name(#[case] schema: Schema, #[case] name: &str) {
        assert_eq!(schema.kind_name(), name);
    }

    #[test]
    fn test_describe_keeps_behavior() {
        let schema = string().min(2).describe("display name");
        assert_eq!(schema.description(), Some("display name"));
        assert_eq!(schema.kind_name(), "string");
        assert!(!schema.is(&Value::from("a")));
    }

    #[test]
    fn test_describe_does_not_touch_clones() {
        let base: Schema = string().into();
        let described = base.clone().describe("x");
        assert_eq!(base.description(), None);
        assert_eq!(described.description(), Some("x"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[test]
    fn test_parse_as() {
        let schema: Schema = object().field("x", number()).field("y", number().default(0)).into();
        let point: Point = schema.parse_as(&json!({"x": 1.5}).into()).unwrap();
        assert_eq!(point, Point { x: 1.5, y: 0.0 });

        let err = schema.parse_as::<Point>(&json!({"x": "1"}).into()).unwrap_err();
        assert_eq!(err.errors().map(|e| e.codes()), Some(vec![ErrorCode::NotNumber]));

        let err = Schema::from(any()).parse_as::<Point>(&Value::from(3)).unwrap_err();
        assert!(matches!(err, ParseError::Deserialize(_)));
    }

    #[test]
    fn test_or_and_first_match() {
        let shout = string().transform(|v| {
            v.as_str()
                .map(|s| Value::from(format!("{s}!")))
                .ok_or("not a string")
        });
        let schema = literal("a").or(shout);
        assert_eq!(schema.validate(&Value::from("a")).unwrap(), Value::from("a"));
        assert_eq!(schema.validate(&Value::from("b")).unwrap(), Value::from("b!"));
    }

    #[test]
    fn test_fallible_factories() {
        assert_eq!(union(Vec::new()).unwrap_err(), SchemaError::EmptyUnion);
        assert_eq!(enumeration(Vec::<Value>::new()).unwrap_err(), SchemaError::EmptyEnum);
        assert_eq!(
            intersection([string().into()]).unwrap_err(),
            SchemaError::IntersectionArity(1)
        );
    }
}
