//! Prelude module for convenient imports.
//!
//! Provides a single `use nebula_schema::prelude::*;` import that brings in
//! the value model, the core traits, every schema factory and the builder
//! types they return.
//!
//! # Examples
//!
//! ```
//! use nebula_schema::prelude::*;
//!
//! let port = number().int().gte(1.0).lte(65535.0).default(8080);
//! assert_eq!(port.validate(&Value::Undefined).unwrap(), Value::from(8080));
//! ```

// ============================================================================
// FOUNDATION: Core traits, errors, options
// ============================================================================

pub use crate::foundation::{
    ErrorCode, ParseError, SchemaError, Validate, ValidationContext, ValidationError,
    ValidationErrors, ValidationOptions, ValidationResult,
};
pub use crate::value::Value;

// ============================================================================
// SCHEMA: Handle, modifiers, factories
// ============================================================================

pub use crate::schema::{
    Schema, SchemaExt, SchemaKind, any, array, boolean, custom, date, discriminated_union,
    enumeration, from_validator, intersection, lazy, literal, map, never, null, number, object,
    preprocess, record, set, string, tuple, union, unknown,
};

// ============================================================================
// BUILDERS: Types returned by the factories
// ============================================================================

pub use crate::combinators::{
    ArraySchema, MapSchema, ObjectSchema, RecordSchema, SetSchema, TupleSchema, UnknownKeys,
};
pub use crate::compiler::CompiledValidator;
pub use crate::validators::{DateSchema, NumberSchema, StringSchema};
