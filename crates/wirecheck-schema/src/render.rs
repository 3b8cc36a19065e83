//! # Shape Rendering
//!
//! Renders a compiled [`Shape`](wirecheck_core::Shape) as a JSON Schema
//! document for the `jsonschema` back-end.
//!
//! | Shape                    | JSON Schema                                    |
//! |--------------------------|------------------------------------------------|
//! | `string`, `file`         | `{"type": "string"}`                           |
//! | `integer`                | `{"type": "integer"}`                          |
//! | `number`                 | `{"type": "number"}`                           |
//! | `boolean`                | `{"type": "boolean"}`                          |
//! | `datetime`               | `{"type": "string", "format": "date-time"}`    |
//! | `enumerated`             | facets only (`enum`)                           |
//! | `nil`                    | `{"type": "null"}`                             |
//! | array                    | `{"type": "array", "items": ...}`              |
//! | object                   | `properties`, `required`, `additionalProperties` |
//! | union                    | `{"anyOf": [...]}`                             |
//!
//! Combinators become `allOf` / `anyOf` / `oneOf` / `not`. Facets are merged
//! last and override rendered keywords of the same name.

use serde_json::{json, Map, Value};
use wirecheck_core::{ConfigError, PrimitiveType, ShapeArena, ShapeDef, ShapeId};

/// Render a shape and everything it references.
pub fn render_schema(arena: &ShapeArena, id: ShapeId) -> Result<Value, ConfigError> {
    let shape = arena.get(id)?;
    let mut schema = Map::new();

    match &shape.def {
        ShapeDef::Scalar { primitive } => render_primitive(&mut schema, *primitive),
        ShapeDef::Array { items } => {
            schema.insert("type".into(), json!("array"));
            schema.insert("items".into(), render_schema(arena, *items)?);
        }
        ShapeDef::Object {
            properties,
            additional_properties,
        } => {
            schema.insert("type".into(), json!("object"));
            let mut rendered = Map::new();
            for property in properties {
                rendered.insert(property.name.clone(), render_schema(arena, property.shape)?);
            }
            schema.insert("properties".into(), Value::Object(rendered));
            let required: Vec<&str> = properties
                .iter()
                .filter(|p| p.required)
                .map(|p| p.name.as_str())
                .collect();
            if !required.is_empty() {
                schema.insert("required".into(), json!(required));
            }
            if !additional_properties {
                schema.insert("additionalProperties".into(), json!(false));
            }
        }
        ShapeDef::Union { alternatives } => {
            if alternatives.is_empty() {
                return Err(ConfigError::UnsupportedShape {
                    shape: arena.label(id),
                    reason: "union with no alternatives".to_string(),
                });
            }
            schema.insert("anyOf".into(), render_all(arena, alternatives)?);
        }
    }

    let combinators = &shape.combinators;
    if !combinators.all_of.is_empty() {
        add_combinator(&mut schema, "allOf", render_all(arena, &combinators.all_of)?);
    }
    if !combinators.any_of.is_empty() {
        add_combinator(&mut schema, "anyOf", render_all(arena, &combinators.any_of)?);
    }
    if !combinators.one_of.is_empty() {
        add_combinator(&mut schema, "oneOf", render_all(arena, &combinators.one_of)?);
    }
    if let Some(not) = combinators.not {
        add_combinator(&mut schema, "not", render_schema(arena, not)?);
    }

    for (keyword, value) in &shape.facets {
        schema.insert(keyword.clone(), value.clone());
    }

    Ok(Value::Object(schema))
}

fn render_primitive(schema: &mut Map<String, Value>, primitive: PrimitiveType) {
    let ty = match primitive {
        PrimitiveType::String | PrimitiveType::File => "string",
        PrimitiveType::Integer => "integer",
        PrimitiveType::Number => "number",
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::DateTime => {
            schema.insert("format".into(), json!("date-time"));
            "string"
        }
        PrimitiveType::Nil => "null",
        PrimitiveType::Enumerated => return,
    };
    schema.insert("type".into(), json!(ty));
}

fn render_all(arena: &ShapeArena, ids: &[ShapeId]) -> Result<Value, ConfigError> {
    ids.iter()
        .map(|id| render_schema(arena, *id))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Insert a combinator keyword. A keyword already taken (a union's
/// `anyOf`) is nested under `allOf` so both constraints hold.
fn add_combinator(schema: &mut Map<String, Value>, keyword: &str, value: Value) {
    if !schema.contains_key(keyword) {
        schema.insert(keyword.to_string(), value);
        return;
    }
    let mut wrapper = Map::new();
    wrapper.insert(keyword.to_string(), value);
    match schema.get_mut("allOf") {
        Some(Value::Array(all_of)) => all_of.push(Value::Object(wrapper)),
        _ => {
            schema.insert("allOf".into(), json!([Value::Object(wrapper)]));
        }
    }
}
