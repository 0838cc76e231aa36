//! Composite schemas and modifiers
//!
//! Composites own their child [`Schema`](crate::Schema)s. The traversal of
//! each composite lives in a `pub(crate)` helper generic over the child
//! validator type, so the interpreted tree and compiled closures share one
//! implementation of every algorithm.

pub mod array;
pub mod collection;
pub mod discriminated;
pub mod intersection;
pub mod lazy;
pub mod message;
pub mod object;
pub mod optional;
pub mod record;
pub mod refine;
pub mod transform;
pub mod tuple;
pub mod union;

pub use array::{ArrayBounds, ArraySchema};
pub use collection::{MapSchema, SetSchema};
pub use discriminated::DiscriminatedUnionSchema;
pub use intersection::IntersectionSchema;
pub use lazy::LazySchema;
pub use message::WithMessage;
pub use object::{ObjectSchema, UnknownKeys};
pub use optional::{Absence, DefaultSchema, DefaultValue, OptionalSchema};
pub use record::RecordSchema;
pub use refine::{
    AsyncPredicate, AsyncRefineSchema, CustomSchema, Predicate, RefineOutcome, RefineSchema,
};
pub use transform::{PipeSchema, PreprocessFn, PreprocessSchema, TransformFn, TransformSchema};
pub use tuple::TupleSchema;
pub use union::UnionSchema;
