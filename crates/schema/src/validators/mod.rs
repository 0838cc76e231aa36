//! Primitive validators
//!
//! Every primitive starts with a type gate that fails with exactly one
//! error. String and number schemas then run their configured checks in a
//! fixed order. They stop at the first failing check unless `abort_early`
//! is explicitly `false`, in which case every failure is collected.

pub mod any;
pub mod boolean;
pub mod date;
pub mod enumeration;
pub mod literal;
pub mod number;
pub mod string;

pub use any::{AnySchema, NeverSchema};
pub use boolean::BooleanSchema;
pub use date::DateSchema;
pub use enumeration::EnumSchema;
pub use literal::{LiteralSchema, NullSchema};
pub use number::{MAX_SAFE_INTEGER, NumberCheck, NumberSchema, Sign};
pub use string::{StringCheck, StringSchema, StringTransforms};
