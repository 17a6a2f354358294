//! YACS core
//!
//! Tree algorithms for JSON configuration documents:
//! - `$ref` resolution across documents, with a shared resolution cache
//! - `@parent` inheritance with `@lock_names` exceptions
//! - structural diffing into a canonical list of path-qualified differences
//!
//! Transport and validation are reached through the [`Loader`] and
//! [`Validator`] traits so callers pick the concrete implementations.

pub mod cache;
pub mod context;
pub mod diff;
pub mod error;
pub mod inherit;
pub mod loader;
pub mod pipeline;
pub mod reference;
pub mod schema;
pub mod value;

pub use cache::ResolutionCache;
pub use context::UriContext;
pub use diff::{canonicalize, diff, DiffKind, Difference};
pub use error::{Error, Result};
pub use inherit::{lock_names, merge_parents, overlay};
pub use loader::{parse_document, Loader};
pub use pipeline::{ProcessOptions, Processor};
pub use reference::{Reference, Resolver};
pub use schema::{strip_schema_references, validate_schemas, JsonSchemaValidator, Validator};
pub use value::Kind;
