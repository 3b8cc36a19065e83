//! # wirecheck-schema — Parameter Validation Engine
//!
//! Validates raw HTTP parameter text (query values, headers, path
//! segments, whole query strings) against declared shapes by encoding the
//! text into a typed document and checking it with a JSON Schema
//! validator.
//!
//! ## Pipeline
//!
//! 1. [`select`] picks a [`Strategy`] from the shape and the declared
//!    serialization style. This happens once, when a [`Parameter`] is built.
//! 2. The strategy encodes the raw value into a JSON document (scalars,
//!    arrays, objects) or a YAML document (unions and aggregates, where
//!    the structure of the value is not known in advance).
//! 3. The document is checked by a validator handle obtained from the
//!    [`ValidatorCache`], built on first use by the [`SchemaBackend`].
//!
//! Union strategies retry once with the value forced to a quoted string
//! when the unquoted reading fails and some alternative accepts strings.
//!
//! ## Crate Policy
//!
//! - Depends only on `wirecheck-core` internally.
//! - The validator back-end is injected through [`SchemaBackend`]; the
//!   engine holds no global state.
//! - Non-conforming input is an `Ok` outcome. `ConfigError` is reserved
//!   for defects in the shapes or the engine configuration.

pub mod backend;
pub mod cache;
pub mod config;
pub mod engine;
pub mod parameter;
pub mod query_string;
pub mod render;
pub mod strategy;

// Re-export primary types for ergonomic imports.
pub use backend::{parse_document, JsonSchemaBackend, JsonSchemaHandle, SchemaBackend, ValidatorHandle};
pub use cache::{CacheKey, ValidatorCache};
pub use config::{EngineConfig, SchemaDraft};
pub use engine::ValidationEngine;
pub use parameter::Parameter;
pub use query_string::{QueryParams, QueryString};
pub use render::render_schema;
pub use strategy::{select, RawValue, Strategy};
