//! # Shape Model
//!
//! The compiled type model of a parameter, header, path segment, or query
//! string. Shapes are produced once when an API description compiles and
//! are read-only afterwards.
//!
//! ## Arena
//!
//! All shapes live in a [`ShapeArena`] and refer to each other by
//! [`ShapeId`]. A shape may only reference ids already in the arena, so
//! [`ShapeArena::insert`] rejects dangling references and the shape graph is
//! acyclic by construction. Validators and cached handles are keyed by
//! `ShapeId`, which stays valid for the lifetime of the arena.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Index of a shape inside its [`ShapeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u32);

impl ShapeId {
    /// Position of the shape in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive type of a scalar shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 timestamp carried as a string.
    DateTime,
    File,
    /// Closed set of allowed values, given by the shape's `enum` facet.
    Enumerated,
    /// The null type. Appears as a union member of nullable shapes.
    Nil,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::File => "file",
            Self::Enumerated => "enumerated",
            Self::Nil => "nil",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared object property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub shape: ShapeId,
    pub required: bool,
}

impl Property {
    pub fn required(name: impl Into<String>, shape: ShapeId) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, shape: ShapeId) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

/// Structural definition of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeDef {
    Scalar {
        primitive: PrimitiveType,
    },
    Array {
        items: ShapeId,
    },
    Object {
        properties: Vec<Property>,
        additional_properties: bool,
    },
    Union {
        alternatives: Vec<ShapeId>,
    },
}

/// Schema composition attached to a shape (`allOf` / `anyOf` / `oneOf` / `not`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Combinators {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<ShapeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<ShapeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<ShapeId>,
}

impl Combinators {
    /// True when no combinator is present.
    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty() && self.one_of.is_empty() && self.not.is_none()
    }

    /// Every shape referenced by a combinator, in `allOf`, `anyOf`, `oneOf`, `not` order.
    pub fn members(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.all_of
            .iter()
            .chain(&self.any_of)
            .chain(&self.one_of)
            .chain(&self.not)
            .copied()
    }
}

/// A node of the compiled type model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub def: ShapeDef,
    #[serde(default)]
    pub combinators: Combinators,
    /// Extra JSON Schema constraint keywords (`minimum`, `pattern`, `enum`, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub facets: Map<String, Value>,
}

impl Shape {
    fn from_def(def: ShapeDef) -> Self {
        Self {
            name: None,
            def,
            combinators: Combinators::default(),
            facets: Map::new(),
        }
    }

    pub fn scalar(primitive: PrimitiveType) -> Self {
        Self::from_def(ShapeDef::Scalar { primitive })
    }

    pub fn array(items: ShapeId) -> Self {
        Self::from_def(ShapeDef::Array { items })
    }

    /// An open object shape. Use [`Shape::closed`] to forbid undeclared properties.
    pub fn object(properties: Vec<Property>) -> Self {
        Self::from_def(ShapeDef::Object {
            properties,
            additional_properties: true,
        })
    }

    pub fn union(alternatives: Vec<ShapeId>) -> Self {
        Self::from_def(ShapeDef::Union { alternatives })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_facet(mut self, keyword: impl Into<String>, value: Value) -> Self {
        self.facets.insert(keyword.into(), value);
        self
    }

    /// Forbid undeclared properties. No effect on non-object shapes.
    pub fn closed(mut self) -> Self {
        if let ShapeDef::Object {
            additional_properties,
            ..
        } = &mut self.def
        {
            *additional_properties = false;
        }
        self
    }

    pub fn with_all_of(mut self, shapes: Vec<ShapeId>) -> Self {
        self.combinators.all_of = shapes;
        self
    }

    pub fn with_any_of(mut self, shapes: Vec<ShapeId>) -> Self {
        self.combinators.any_of = shapes;
        self
    }

    pub fn with_one_of(mut self, shapes: Vec<ShapeId>) -> Self {
        self.combinators.one_of = shapes;
        self
    }

    pub fn with_not(mut self, shape: ShapeId) -> Self {
        self.combinators.not = Some(shape);
        self
    }

    /// Primitive type, if this is a scalar shape.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.def {
            ShapeDef::Scalar { primitive } => Some(primitive),
            _ => None,
        }
    }

    /// Declared properties, if this is an object shape.
    pub fn properties(&self) -> &[Property] {
        match &self.def {
            ShapeDef::Object { properties, .. } => properties,
            _ => &[],
        }
    }

    /// Look up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name == name)
    }

    fn references(&self) -> Vec<ShapeId> {
        let mut ids: Vec<ShapeId> = match &self.def {
            ShapeDef::Scalar { .. } => Vec::new(),
            ShapeDef::Array { items } => vec![*items],
            ShapeDef::Object { properties, .. } => properties.iter().map(|p| p.shape).collect(),
            ShapeDef::Union { alternatives } => alternatives.clone(),
        };
        ids.extend(self.combinators.members());
        ids
    }
}

/// Append-only owner of every shape of a compiled API description.
#[derive(Debug, Clone, Default)]
pub struct ShapeArena {
    shapes: Vec<Shape>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape and return its id.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownShape` if the shape references an id
    /// that is not already in the arena, and `ConfigError::InvalidConfig`
    /// once the arena holds `u32::MAX` shapes.
    pub fn insert(&mut self, shape: Shape) -> Result<ShapeId, ConfigError> {
        if let Some(missing) = shape
            .references()
            .into_iter()
            .find(|id| id.index() >= self.shapes.len())
        {
            return Err(ConfigError::UnknownShape(missing));
        }
        let id = id_at(self.shapes.len())?;
        self.shapes.push(shape);
        Ok(id)
    }

    /// Shorthand for inserting an unnamed scalar shape.
    pub fn scalar(&mut self, primitive: PrimitiveType) -> Result<ShapeId, ConfigError> {
        self.insert(Shape::scalar(primitive))
    }

    pub fn get(&self, id: ShapeId) -> Result<&Shape, ConfigError> {
        self.shapes.get(id.index()).ok_or(ConfigError::UnknownShape(id))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Human-readable label for diagnostics: the shape name, or its id.
    pub fn label(&self, id: ShapeId) -> String {
        self.shapes
            .get(id.index())
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// True when the shape admits a null value: a `Nil` scalar, or a union
    /// with a member that admits null.
    pub fn accepts_null(&self, id: ShapeId) -> bool {
        match self.shapes.get(id.index()).map(|s| &s.def) {
            Some(ShapeDef::Scalar {
                primitive: PrimitiveType::Nil,
            }) => true,
            Some(ShapeDef::Union { alternatives }) => {
                alternatives.iter().any(|alt| self.accepts_null(*alt))
            }
            _ => false,
        }
    }
}

fn id_at(index: usize) -> Result<ShapeId, ConfigError> {
    u32::try_from(index)
        .map(ShapeId)
        .map_err(|_| ConfigError::InvalidConfig(format!("shape arena is full at {index} shapes")))
}
