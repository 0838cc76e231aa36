//! Core validation types and traits
//!
//! - **Traits**: [`Validate`]
//! - **Errors**: [`ValidationError`], [`ValidationErrors`], [`ErrorCode`],
//!   [`ParseError`], [`SchemaError`]
//! - **Context**: [`ValidationOptions`], [`ValidationContext`]
//!
//! Validation never panics on bad input: a failure is an
//! `Err(ValidationErrors)` carrying at least one error, each with the code,
//! resolved message and field path of what went wrong.

pub mod context;
pub mod error;
pub mod path;
pub mod traits;

pub use context::{DEFAULT_MAX_DEPTH, ValidationContext, ValidationOptions};
pub use error::{
    ErrorCode, ErrorParams, ParseError, SchemaError, ValidationError, ValidationErrors,
};
pub(crate) use error::ErrorSink;
pub use path::{PathSegment, render_path};
pub use traits::{Validate, ValidationResult};
