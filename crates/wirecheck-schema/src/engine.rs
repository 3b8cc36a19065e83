//! # Validation Engine
//!
//! Owns the compiled shapes, the validator back-end, and the validator
//! cache, and constructs [`Parameter`] and [`QueryString`] capabilities on
//! top of them. All three collaborators are injected; nothing is global.

use std::fmt;
use std::sync::Arc;

use wirecheck_core::{
    structural_kind, ConfigError, MediaType, SerializationStyle, ShapeArena, ShapeId, ShapeKind,
};

use crate::backend::{JsonSchemaBackend, SchemaBackend, ValidatorHandle};
use crate::cache::ValidatorCache;
use crate::config::EngineConfig;
use crate::parameter::Parameter;
use crate::query_string::QueryString;
use crate::strategy;

/// Shared validation context for one compiled API description.
///
/// Capabilities hold an `Arc` to the engine, so construct it once and
/// share it: `Arc::new(ValidationEngine::new(arena, backend))`.
pub struct ValidationEngine {
    shapes: ShapeArena,
    backend: Arc<dyn SchemaBackend>,
    cache: ValidatorCache,
}

impl ValidationEngine {
    pub fn new(shapes: ShapeArena, backend: impl SchemaBackend + 'static) -> Self {
        Self::with_cache(shapes, Arc::new(backend), ValidatorCache::new())
    }

    /// Engine over the `jsonschema` back-end configured by `config`.
    pub fn from_config(shapes: ShapeArena, config: EngineConfig) -> Self {
        Self::new(shapes, JsonSchemaBackend::new(config))
    }

    pub fn with_cache(shapes: ShapeArena, backend: Arc<dyn SchemaBackend>, cache: ValidatorCache) -> Self {
        Self {
            shapes,
            backend,
            cache,
        }
    }

    pub fn shapes(&self) -> &ShapeArena {
        &self.shapes
    }

    pub fn cache(&self) -> &ValidatorCache {
        &self.cache
    }

    /// Validator for `shape` reading `media_type` documents, built on first use.
    ///
    /// # Errors
    ///
    /// Returns the back-end's `ConfigError` if the validator cannot be built.
    pub fn validator(&self, shape: ShapeId, media_type: MediaType) -> Result<Arc<dyn ValidatorHandle>, ConfigError> {
        self.cache.get_or_build((shape, media_type), || {
            self.backend.build_validator(&self.shapes, shape, media_type)
        })
    }

    /// Build a parameter capability. The strategy is chosen here, so an
    /// unsupported shape fails immediately.
    pub fn parameter(
        self: &Arc<Self>,
        name: impl Into<String>,
        shape: ShapeId,
        style: SerializationStyle,
        required: bool,
    ) -> Result<Parameter, ConfigError> {
        let strategy = strategy::select(&self.shapes, shape, style)?;
        let repeated = style != SerializationStyle::SimpleNonExploded
            && structural_kind(&self.shapes, shape)? == ShapeKind::Array;
        Ok(Parameter::new(
            Arc::clone(self),
            name.into(),
            shape,
            style,
            strategy,
            required,
            repeated,
        ))
    }

    /// Build a query-string capability over an object shape or a union of
    /// object shapes.
    pub fn query_string(self: &Arc<Self>, shape: ShapeId, style: SerializationStyle) -> Result<QueryString, ConfigError> {
        QueryString::new(self, shape, style)
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("shapes", &self.shapes.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
