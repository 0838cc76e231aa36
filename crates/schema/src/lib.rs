//! # nebula-schema
//!
//! Runtime schema validation for dynamic values in the Nebula workflow
//! engine: build a schema tree once, then validate untrusted input against
//! it and get back either the typed-checked (and possibly transformed)
//! value or every error with its code, message and path.
//!
//! ## Quick Start
//!
//! ```
//! use nebula_schema::prelude::*;
//! use serde_json::json;
//!
//! let user = object()
//!     .field("name", string().trim().min(1))
//!     .field("age", number().int().nonnegative().optional())
//!     .field("tags", array(string()).unique())
//!     .strict();
//!
//! let out = user.validate(&json!({"name": "  ada ", "tags": []}).into()).unwrap();
//! assert_eq!(out.get("name"), Some(&Value::from("ada")));
//!
//! let errors = user.validate(&json!({"name": "", "tags": ["a", "a"]}).into()).unwrap_err();
//! assert_eq!(errors.paths(), vec!["name", "tags[1]"]);
//! ```
//!
//! ## Layout
//!
//! - [`foundation`]: the [`Validate`] trait, errors, options and context
//! - [`validators`]: primitive schemas (string, number, boolean, date, ...)
//! - [`combinators`]: composites and modifiers (object, array, union, ...)
//! - [`schema`]: the [`Schema`] handle, factories and [`SchemaExt`]
//! - [`compiler`]: closure compilation of schema trees
//! - [`messages`]: default English messages and overrides
//! - [`security`]: dangerous-key deny-list and depth limit
//!
//! Validation is synchronous; [`Schema::validate_async`] additionally runs
//! async refinements, sequentially or concurrently.

// ValidationErrors is the error type of every validation call; boxing it
// would add an allocation to each failure path.
#![allow(clippy::result_large_err)]
// Node closures and async predicates are spelled out as trait-object types.
#![allow(clippy::type_complexity)]

mod asynchronous;
pub mod combinators;
pub mod compiler;
pub mod foundation;
mod macros;
pub mod messages;
pub mod prelude;
pub mod schema;
pub mod security;
pub mod validators;
pub mod value;

#[doc(hidden)]
pub use macros::__private;

pub use combinators::{
    ArraySchema, DiscriminatedUnionSchema, IntersectionSchema, LazySchema, MapSchema,
    ObjectSchema, RecordSchema, RefineOutcome, SetSchema, TupleSchema, UnionSchema, UnknownKeys,
};
pub use compiler::{CompiledValidator, compile};
pub use foundation::{
    DEFAULT_MAX_DEPTH, ErrorCode, ErrorParams, ParseError, SchemaError, Validate,
    ValidationContext, ValidationError, ValidationErrors, ValidationOptions, ValidationResult,
};
pub use messages::{MessageTable, MessageTemplate};
pub use schema::{
    Schema, SchemaExt, SchemaKind, any, array, boolean, custom, date, discriminated_union,
    enumeration, from_validator, intersection, lazy, literal, map, never, null, number, object,
    preprocess, record, set, string, tuple, union, unknown,
};
pub use security::{DANGEROUS_KEYS, is_dangerous_key, sanitize};
pub use validators::{
    AnySchema, BooleanSchema, DateSchema, EnumSchema, LiteralSchema, NeverSchema, NullSchema,
    NumberSchema, StringSchema,
};
pub use value::{Object, Value};
