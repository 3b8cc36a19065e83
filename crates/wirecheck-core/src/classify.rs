//! # Shape Classification
//!
//! Reduces a [`Shape`](crate::Shape) to the closed set of kinds the
//! strategy factory dispatches on.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shape::{PrimitiveType, ShapeArena, ShapeDef, ShapeId};

/// Structural kind of a shape, with combinators taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Scalar(PrimitiveType),
    Array,
    Object,
    Union,
    /// A scalar or object shape carrying non-empty `allOf`/`anyOf`/`oneOf`/`not`.
    Aggregate,
}

impl ShapeKind {
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Scalar(_))
    }
}

/// Classify a shape.
///
/// Arrays and unions always keep their own kind. Any other shape with
/// combinators is [`ShapeKind::Aggregate`], since composition cannot be
/// pre-quoted safely.
pub fn classify(arena: &ShapeArena, id: ShapeId) -> Result<ShapeKind, ConfigError> {
    let shape = arena.get(id)?;
    let kind = match &shape.def {
        ShapeDef::Array { .. } => ShapeKind::Array,
        ShapeDef::Union { .. } => ShapeKind::Union,
        _ if !shape.combinators.is_empty() => ShapeKind::Aggregate,
        ShapeDef::Scalar { primitive } => ShapeKind::Scalar(*primitive),
        ShapeDef::Object { .. } => ShapeKind::Object,
    };
    Ok(kind)
}

/// Kind of a shape ignoring its combinators.
pub fn structural_kind(arena: &ShapeArena, id: ShapeId) -> Result<ShapeKind, ConfigError> {
    let kind = match &arena.get(id)?.def {
        ShapeDef::Scalar { primitive } => ShapeKind::Scalar(*primitive),
        ShapeDef::Array { .. } => ShapeKind::Array,
        ShapeDef::Object { .. } => ShapeKind::Object,
        ShapeDef::Union { .. } => ShapeKind::Union,
    };
    Ok(kind)
}

/// Item primitive of an array whose items are plain (combinator-free) scalars.
pub fn scalar_items(arena: &ShapeArena, id: ShapeId) -> Result<Option<PrimitiveType>, ConfigError> {
    match &arena.get(id)?.def {
        ShapeDef::Array { items } => match classify(arena, *items)? {
            ShapeKind::Scalar(primitive) => Ok(Some(primitive)),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}
