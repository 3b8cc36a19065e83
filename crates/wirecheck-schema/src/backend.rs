//! # Validator Back-end
//!
//! The seam between encoding and conformance checking. Strategies never
//! look inside a validator: they hand it a media type and a document and
//! read back an [`Outcome`].
//!
//! ## Capabilities
//!
//! - [`SchemaBackend`] builds a [`ValidatorHandle`] for one shape and media
//!   type. Building is expensive and side-effect free, so handles are
//!   memoized by the [`ValidatorCache`](crate::ValidatorCache).
//! - [`ValidatorHandle`] parses a document and checks it.
//!
//! ## JSON Schema
//!
//! [`JsonSchemaBackend`] renders the shape with
//! [`render_schema`](crate::render::render_schema) and compiles it with the
//! `jsonschema` crate. JSON documents are parsed with `serde_json`; YAML
//! documents with `serde_yaml`, then converted to the equivalent JSON value
//! tree. A document that does not parse is a non-conformance, not an error.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;
use serde_yaml::Value as Yaml;
use wirecheck_core::{ConfigError, Diagnostic, MediaType, Outcome, ShapeArena, ShapeId};

use crate::config::EngineConfig;
use crate::render::render_schema;

/// A compiled validator bound to one shape and media type.
pub trait ValidatorHandle: Send + Sync {
    /// Check a document written in `media_type`.
    fn check(&self, media_type: MediaType, document: &str) -> Outcome;
}

/// Builds validator handles for shapes.
pub trait SchemaBackend: Send + Sync {
    /// Build a validator for `shape` reading `media_type` documents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidatorUnavailable` if the shape cannot
    /// produce a validator for the media type.
    fn build_validator(
        &self,
        arena: &ShapeArena,
        shape: ShapeId,
        media_type: MediaType,
    ) -> Result<Arc<dyn ValidatorHandle>, ConfigError>;
}

/// Back-end compiling rendered shapes with the `jsonschema` crate.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaBackend {
    config: EngineConfig,
}

impl JsonSchemaBackend {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn build_options(&self) -> jsonschema::ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(self.config.draft.to_jsonschema());
        opts.should_validate_formats(self.config.validate_formats);
        opts
    }
}

impl SchemaBackend for JsonSchemaBackend {
    fn build_validator(
        &self,
        arena: &ShapeArena,
        shape: ShapeId,
        media_type: MediaType,
    ) -> Result<Arc<dyn ValidatorHandle>, ConfigError> {
        let unavailable = |reason: String| ConfigError::ValidatorUnavailable {
            shape: arena.label(shape),
            media_type: media_type.to_string(),
            reason,
        };

        if !self.config.supports(media_type) {
            return Err(unavailable("media type is not enabled".to_string()));
        }

        let schema = render_schema(arena, shape)?;
        let validator = self
            .build_options()
            .build(&schema)
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(Arc::new(JsonSchemaHandle {
            label: arena.label(shape),
            validator,
        }))
    }
}

/// A compiled JSON Schema validator.
pub struct JsonSchemaHandle {
    label: String,
    validator: Validator,
}

impl fmt::Debug for JsonSchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaHandle")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl ValidatorHandle for JsonSchemaHandle {
    fn check(&self, media_type: MediaType, document: &str) -> Outcome {
        let instance = match parse_document(media_type, document) {
            Ok(instance) => instance,
            Err(reason) => {
                return Outcome::rejected(vec![Diagnostic::root(format!(
                    "malformed {media_type} document: {reason}"
                ))]);
            }
        };

        let diagnostics: Vec<Diagnostic> = self
            .validator
            .iter_errors(&instance)
            .map(|e| Diagnostic {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if diagnostics.is_empty() {
            Outcome::conforming()
        } else {
            Outcome::rejected(diagnostics)
        }
    }
}

/// Parse document text into a JSON value tree.
pub fn parse_document(media_type: MediaType, document: &str) -> Result<Value, String> {
    match media_type {
        MediaType::Json => serde_json::from_str(document).map_err(|e| e.to_string()),
        MediaType::Yaml => {
            let yaml: Yaml = serde_yaml::from_str(document).map_err(|e| e.to_string())?;
            yaml_to_json(&yaml, "")
        }
    }
}

/// Convert a parsed YAML document into the JSON value tree validators read.
///
/// Tags are dropped and scalar map keys become strings. Values with no
/// JSON counterpart (non-finite floats, composite keys) are reported with
/// the JSON pointer of the offending node.
fn yaml_to_json(node: &Yaml, pointer: &str) -> Result<Value, String> {
    let value = match node {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => {
            yaml_number(n).ok_or_else(|| at(pointer, format!("number {n} has no JSON form")))?
        }
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| yaml_to_json(item, &format!("{pointer}/{i}")))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Mapping(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (key, item) in entries {
                let key = yaml_key(key)
                    .ok_or_else(|| at(pointer, "mapping key is not a scalar".to_string()))?;
                let child = format!("{pointer}/{}", key.replace('~', "~0").replace('/', "~1"));
                object.insert(key, yaml_to_json(item, &child)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value, pointer)?,
    };
    Ok(value)
}

fn yaml_number(n: &serde_yaml::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        Some(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(Value::from(u))
    } else {
        n.as_f64().and_then(serde_json::Number::from_f64).map(Value::Number)
    }
}

fn yaml_key(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Null => Some("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(&tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => None,
    }
}

fn at(pointer: &str, reason: String) -> String {
    if pointer.is_empty() {
        format!("(root): {reason}")
    } else {
        format!("{pointer}: {reason}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wirecheck_core::{PrimitiveType, Property, Shape};

    fn build(arena: &ShapeArena, id: ShapeId, media_type: MediaType) -> Arc<dyn ValidatorHandle> {
        JsonSchemaBackend::default()
            .build_validator(arena, id, media_type)
            .unwrap()
    }

    #[test]
    fn test_integer_json() {
        let mut arena = ShapeArena::new();
        let i = arena.scalar(PrimitiveType::Integer).unwrap();
        let handle = build(&arena, i, MediaType::Json);
        assert!(handle.check(MediaType::Json, "123").conforms);
        assert!(!handle.check(MediaType::Json, r#""123""#).conforms);
    }

    #[test]
    fn test_malformed_json_is_rejection() {
        let mut arena = ShapeArena::new();
        let i = arena.scalar(PrimitiveType::Integer).unwrap();
        let handle = build(&arena, i, MediaType::Json);
        let outcome = handle.check(MediaType::Json, "0123");
        assert!(!outcome.conforms);
        assert!(outcome.message().starts_with("malformed application/json document"));
    }

    #[test]
    fn test_yaml_documents_keep_structure() {
        let mut arena = ShapeArena::new();
        let i = arena.scalar(PrimitiveType::Integer).unwrap();
        let s = arena.scalar(PrimitiveType::String).unwrap();
        let u = arena.insert(Shape::union(vec![i, s])).unwrap();
        let handle = build(&arena, u, MediaType::Yaml);
        assert!(handle.check(MediaType::Yaml, "42").conforms);
        assert!(handle.check(MediaType::Yaml, "hello").conforms);
        assert!(!handle.check(MediaType::Yaml, "key: value").conforms);
    }

    #[test]
    fn test_diagnostics_carry_paths() {
        let mut arena = ShapeArena::new();
        let i = arena.scalar(PrimitiveType::Integer).unwrap();
        let obj = arena
            .insert(Shape::object(vec![Property::required("age", i)]))
            .unwrap();
        let handle = build(&arena, obj, MediaType::Json);
        let outcome = handle.check(MediaType::Json, r#"{"age":"x"}"#);
        assert!(!outcome.conforms);
        assert_eq!(outcome.diagnostics[0].instance_path, "/age");
    }

    #[test]
    fn test_date_time_format_enforced() {
        let mut arena = ShapeArena::new();
        let dt = arena.scalar(PrimitiveType::DateTime).unwrap();
        let handle = build(&arena, dt, MediaType::Json);
        assert!(handle.check(MediaType::Json, r#""2024-03-01T10:00:00Z""#).conforms);
        assert!(!handle.check(MediaType::Json, r#""yesterday""#).conforms);
    }

    #[test]
    fn test_disabled_media_type_unavailable() {
        let mut arena = ShapeArena::new();
        let s = arena.scalar(PrimitiveType::String).unwrap();
        let backend = JsonSchemaBackend::new(EngineConfig {
            media_types: vec![MediaType::Json],
            ..EngineConfig::default()
        });
        let err = backend.build_validator(&arena, s, MediaType::Yaml).err().unwrap();
        assert!(matches!(err, ConfigError::ValidatorUnavailable { .. }));
    }

    #[test]
    fn test_invalid_facet_unavailable() {
        let mut arena = ShapeArena::new();
        let s = arena
            .insert(Shape::scalar(PrimitiveType::String).with_facet("pattern", json!("(")))
            .unwrap();
        let err = JsonSchemaBackend::default()
            .build_validator(&arena, s, MediaType::Json)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::ValidatorUnavailable { .. }));
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml_str = r#"
name: widget
count: 42
enabled: true
items:
  - one
  - two
"#;
        let json_value = parse_document(MediaType::Yaml, yaml_str).unwrap();
        assert_eq!(json_value["name"], "widget");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["items"][1], "two");
    }

    #[test]
    fn test_yaml_conversion_errors_carry_pointer() {
        let err = parse_document(MediaType::Yaml, "limits:\n  a/b:\n    - 1\n    - .nan\n")
            .unwrap_err();
        assert!(err.starts_with("/limits/a~1b/1:"), "unexpected error: {err}");
    }

    #[test]
    fn test_yaml_tags_and_scalar_keys() {
        let value = parse_document(MediaType::Yaml, "1: !custom yes-ish\ntrue: 2\n").unwrap();
        assert_eq!(value["1"], "yes-ish");
        assert_eq!(value["true"], 2);
    }
}
