//! # Validation Strategies
//!
//! A strategy turns raw wire value(s) into a document a validator can read,
//! then runs the validator. One strategy is chosen per parameter by
//! [`select`] and fixed for the parameter's lifetime.
//!
//! | Strategy | Document | Encoding |
//! |----------|----------|----------|
//! | [`Strategy::Scalar`] | JSON | one literal, quoted per the quoting policy |
//! | [`Strategy::Array`]  | JSON | `a,b,c` or repeated values as a JSON array of literals |
//! | [`Strategy::Object`] | JSON | `k,v,k,v` as a JSON object, values quoted per property type |
//! | [`Strategy::Union`]  | YAML | raw value as-is, retried once quoted |
//!
//! ## Selection order
//!
//! 1. OpenAPI `simple`/non-exploded and `form`/exploded parameters whose
//!    structure is an object, a scalar-item array, or a scalar get the
//!    dedicated encoder, even when combinators are present.
//! 2. Arrays, unions, aggregates, and other objects use the union strategy.
//! 3. Plain scalars use the scalar strategy, quoted or not.
//!
//! ## Limitations
//!
//! Flattened arrays and objects are split on every `,`. A value containing
//! a literal comma cannot be represented in those conventions.

use wirecheck_core::{
    classify, encode_literal, needs_quotes, quote, scalar_items, structural_kind, ConfigError,
    Diagnostic, MediaType, Outcome, PrimitiveType, Property, SerializationStyle, ShapeArena,
    ShapeDef, ShapeId, ShapeKind,
};

use crate::engine::ValidationEngine;

/// Raw wire value of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    /// The parameter was present without a value.
    Null,
    Single(&'a str),
    /// Repeated parameter, in wire order.
    Multi(&'a [&'a str]),
}

impl<'a> From<Option<&'a str>> for RawValue<'a> {
    fn from(raw: Option<&'a str>) -> Self {
        raw.map_or(Self::Null, Self::Single)
    }
}

/// Encoding and validation strategy for one parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Scalar {
        primitive: PrimitiveType,
        quoted: bool,
    },
    /// Array of plain scalars.
    Array { item: PrimitiveType },
    Object,
    /// Structure-preserving path for unions, aggregates, and nested structures.
    Union {
        /// A member would misparse unquoted; retry once with the value quoted.
        retry_quoted: bool,
        /// Outcome for a null value, computed without the validator.
        accepts_null: bool,
    },
}

/// Choose the strategy for a shape under a serialization style.
///
/// # Errors
///
/// Returns `ConfigError::UnknownShape` for ids outside the arena and
/// `ConfigError::UnsupportedShape` for unions without alternatives.
pub fn select(arena: &ShapeArena, id: ShapeId, style: SerializationStyle) -> Result<Strategy, ConfigError> {
    let strategy = select_inner(arena, id, style)?;
    tracing::trace!(shape = %arena.label(id), %style, ?strategy, "strategy selected");
    Ok(strategy)
}

fn select_inner(arena: &ShapeArena, id: ShapeId, style: SerializationStyle) -> Result<Strategy, ConfigError> {
    if style.is_oas() {
        match structural_kind(arena, id)? {
            ShapeKind::Object => return Ok(Strategy::Object),
            ShapeKind::Scalar(primitive) => return Ok(scalar(primitive)),
            ShapeKind::Array => {
                if let Some(item) = scalar_items(arena, id)? {
                    return Ok(Strategy::Array { item });
                }
            }
            _ => {}
        }
    }

    match classify(arena, id)? {
        ShapeKind::Scalar(primitive) => Ok(scalar(primitive)),
        ShapeKind::Array | ShapeKind::Union | ShapeKind::Aggregate | ShapeKind::Object => {
            if let ShapeDef::Union { alternatives } = &arena.get(id)?.def {
                if alternatives.is_empty() {
                    return Err(ConfigError::UnsupportedShape {
                        shape: arena.label(id),
                        reason: "union with no alternatives".to_string(),
                    });
                }
            }
            Ok(Strategy::Union {
                retry_quoted: has_quotable_member(arena, id)?,
                accepts_null: arena.accepts_null(id),
            })
        }
    }
}

fn scalar(primitive: PrimitiveType) -> Strategy {
    Strategy::Scalar {
        primitive,
        quoted: needs_quotes(primitive),
    }
}

/// Whether a union member (or, for other shapes, the shape itself or a
/// combinator member) needs quotes.
fn has_quotable_member(arena: &ShapeArena, id: ShapeId) -> Result<bool, ConfigError> {
    let shape = arena.get(id)?;
    let members: Vec<ShapeId> = match &shape.def {
        ShapeDef::Union { alternatives } => alternatives.clone(),
        ShapeDef::Array { items } => vec![*items],
        _ => std::iter::once(id).chain(shape.combinators.members()).collect(),
    };
    for member in members {
        if quotable(arena, member)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A scalar that needs quotes, or a union reaching one through its
/// alternatives (`string | nil`).
fn quotable(arena: &ShapeArena, id: ShapeId) -> Result<bool, ConfigError> {
    match &arena.get(id)?.def {
        ShapeDef::Scalar { primitive } => Ok(needs_quotes(*primitive)),
        ShapeDef::Union { alternatives } => {
            for alternative in alternatives {
                if quotable(arena, *alternative)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// Quoting for one literal of a scalar-like shape: a scalar, or a union
/// of scalar-like alternatives, quoted when any alternative is. `None` for
/// structured shapes, whose values pass through as written.
fn literal_quoting(arena: &ShapeArena, id: ShapeId) -> Result<Option<bool>, ConfigError> {
    match &arena.get(id)?.def {
        ShapeDef::Scalar { primitive } => Ok(Some(needs_quotes(*primitive))),
        ShapeDef::Union { alternatives } if !alternatives.is_empty() => {
            let mut quoted = false;
            for alternative in alternatives {
                match literal_quoting(arena, *alternative)? {
                    Some(q) => quoted |= q,
                    None => return Ok(None),
                }
            }
            Ok(Some(quoted))
        }
        _ => Ok(None),
    }
}

/// Find a property declared on the shape itself, then on its `allOf`,
/// `anyOf` and `oneOf` members (and union alternatives) in declaration
/// order.
fn find_property<'a>(arena: &'a ShapeArena, id: ShapeId, name: &str) -> Result<Option<&'a Property>, ConfigError> {
    let shape = arena.get(id)?;
    if let Some(property) = shape.property(name) {
        return Ok(Some(property));
    }
    let combinators = &shape.combinators;
    let alternatives: &[ShapeId] = match &shape.def {
        ShapeDef::Union { alternatives } => alternatives.as_slice(),
        _ => &[],
    };
    let members = combinators
        .all_of
        .iter()
        .chain(&combinators.any_of)
        .chain(&combinators.one_of)
        .chain(alternatives);
    for member in members {
        if let Some(property) = find_property(arena, *member, name)? {
            return Ok(Some(property));
        }
    }
    Ok(None)
}

impl Strategy {
    /// Media type of the documents this strategy produces.
    pub fn media_type(self) -> MediaType {
        match self {
            Self::Union { .. } => MediaType::Yaml,
            _ => MediaType::Json,
        }
    }

    /// Encode a raw value into the first document this strategy submits.
    pub fn encode(self, arena: &ShapeArena, shape: ShapeId, raw: RawValue<'_>) -> Result<String, ConfigError> {
        let document = match self {
            Self::Scalar { quoted, .. } => encode_scalar(raw, quoted),
            Self::Array { item } => encode_array(raw, item),
            Self::Object => encode_object(arena, shape, raw)?,
            Self::Union { .. } => encode_structured(raw, false),
        };
        Ok(document)
    }

    /// Encode `raw` and check it with the validator for `shape`.
    pub(crate) fn run(
        self,
        engine: &ValidationEngine,
        shape: ShapeId,
        raw: RawValue<'_>,
    ) -> Result<Outcome, ConfigError> {
        let Self::Union {
            retry_quoted,
            accepts_null,
        } = self
        else {
            let document = self.encode(engine.shapes(), shape, raw)?;
            let validator = engine.validator(shape, MediaType::Json)?;
            return Ok(validator.check(MediaType::Json, &document));
        };

        if raw == RawValue::Null {
            return Ok(null_outcome(accepts_null));
        }

        let validator = engine.validator(shape, MediaType::Yaml)?;
        let outcome = validator.check(MediaType::Yaml, &encode_structured(raw, false));
        if outcome.conforms || !retry_quoted {
            return Ok(outcome);
        }
        tracing::trace!(shape = %engine.shapes().label(shape), "retrying with quoted value");
        Ok(validator.check(MediaType::Yaml, &encode_structured(raw, true)))
    }
}

fn null_outcome(accepts_null: bool) -> Outcome {
    if accepts_null {
        Outcome::conforming()
    } else {
        Outcome::rejected(vec![Diagnostic::root("null is not allowed")])
    }
}

fn json_array<I>(literals: I) -> String
where
    I: IntoIterator<Item = String>,
{
    format!("[{}]", literals.into_iter().collect::<Vec<_>>().join(","))
}

/// Encode a scalar literal. Repeated values become a JSON array, which a
/// scalar validator rejects.
pub fn encode_scalar(raw: RawValue<'_>, quoted: bool) -> String {
    match raw {
        RawValue::Null => "null".to_string(),
        RawValue::Single(value) => encode_literal(value, quoted),
        RawValue::Multi([value]) => encode_literal(value, quoted),
        RawValue::Multi(values) => json_array(values.iter().map(|v| encode_literal(v, quoted))),
    }
}

/// Encode array items as a JSON array. A single value is split on `,`.
pub fn encode_array(raw: RawValue<'_>, item: PrimitiveType) -> String {
    let quoted = needs_quotes(item);
    match raw {
        RawValue::Null => "null".to_string(),
        RawValue::Single(value) => json_array(value.split(',').map(|v| encode_literal(v, quoted))),
        RawValue::Multi(values) => json_array(values.iter().map(|v| encode_literal(v, quoted))),
    }
}

/// Encode alternating `key,value` tokens as a JSON object.
///
/// Values of declared scalar properties are quoted per their type, with
/// properties resolved through combinator members too; other values pass
/// through as-is. An odd token count submits the raw input
/// unchanged so the validator reports it.
pub fn encode_object(arena: &ShapeArena, shape: ShapeId, raw: RawValue<'_>) -> Result<String, ConfigError> {
    let tokens: Vec<&str> = match raw {
        RawValue::Null => return Ok("null".to_string()),
        RawValue::Single(value) => value.split(',').collect(),
        RawValue::Multi(values) => values.to_vec(),
    };
    if tokens.len() % 2 != 0 {
        return Ok(tokens.join(","));
    }

    let mut members = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks_exact(2) {
        let (key, value) = (pair[0], pair[1]);
        let quoting = match find_property(arena, shape, key)? {
            Some(property) => literal_quoting(arena, property.shape)?,
            None => None,
        };
        let literal = match quoting {
            Some(quoted) => encode_literal(value, quoted),
            None => value.to_string(),
        };
        members.push(format!("{}:{}", quote(key), literal));
    }
    Ok(format!("{{{}}}", members.join(",")))
}

/// Encode a value for the structure-preserving YAML path.
///
/// Unquoted, the value is submitted as written. Repeated values become a
/// block sequence, one item per line.
pub fn encode_structured(raw: RawValue<'_>, quoted: bool) -> String {
    let literal = |value: &str| {
        if quoted || value.starts_with('*') {
            quote(value)
        } else {
            value.to_string()
        }
    };
    match raw {
        RawValue::Null => "null".to_string(),
        RawValue::Single(value) => literal(value),
        RawValue::Multi([]) => "[]".to_string(),
        RawValue::Multi(values) => values
            .iter()
            .map(|v| format!("- {}\n", literal(*v)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirecheck_core::Shape;

    struct Fixture {
        arena: ShapeArena,
        string: ShapeId,
        integer: ShapeId,
        boolean: ShapeId,
    }

    fn fixture() -> Fixture {
        let mut arena = ShapeArena::new();
        let string = arena.scalar(PrimitiveType::String).unwrap();
        let integer = arena.scalar(PrimitiveType::Integer).unwrap();
        let boolean = arena.scalar(PrimitiveType::Boolean).unwrap();
        Fixture {
            arena,
            string,
            integer,
            boolean,
        }
    }

    #[test]
    fn test_select_plain_scalars() {
        let f = fixture();
        assert_eq!(
            select(&f.arena, f.string, SerializationStyle::Default).unwrap(),
            Strategy::Scalar {
                primitive: PrimitiveType::String,
                quoted: true
            }
        );
        assert_eq!(
            select(&f.arena, f.integer, SerializationStyle::Default).unwrap(),
            Strategy::Scalar {
                primitive: PrimitiveType::Integer,
                quoted: false
            }
        );
    }

    #[test]
    fn test_select_default_style_structures_use_union_path() {
        let mut f = fixture();
        let arr = f.arena.insert(Shape::array(f.integer)).unwrap();
        let obj = f
            .arena
            .insert(Shape::object(vec![Property::required("a", f.string)]))
            .unwrap();
        let uni = f.arena.insert(Shape::union(vec![f.integer, f.boolean])).unwrap();
        for id in [arr, obj, uni] {
            assert!(matches!(
                select(&f.arena, id, SerializationStyle::Default).unwrap(),
                Strategy::Union { .. }
            ));
        }
    }

    #[test]
    fn test_select_oas_styles_use_dedicated_encoders() {
        let mut f = fixture();
        let arr = f.arena.insert(Shape::array(f.integer)).unwrap();
        let obj = f
            .arena
            .insert(Shape::object(vec![Property::required("a", f.string)]))
            .unwrap();
        for style in [SerializationStyle::FormExploded, SerializationStyle::SimpleNonExploded] {
            assert_eq!(
                select(&f.arena, arr, style).unwrap(),
                Strategy::Array {
                    item: PrimitiveType::Integer
                }
            );
            assert_eq!(select(&f.arena, obj, style).unwrap(), Strategy::Object);
        }
    }

    #[test]
    fn test_oas_style_wins_over_combinators() {
        let mut f = fixture();
        let a = f
            .arena
            .insert(Shape::object(vec![Property::required("a", f.string)]))
            .unwrap();
        let b = f
            .arena
            .insert(Shape::object(vec![Property::required("b", f.integer)]))
            .unwrap();
        let one_of = f
            .arena
            .insert(Shape::object(Vec::new()).with_one_of(vec![a, b]))
            .unwrap();
        assert_eq!(
            select(&f.arena, one_of, SerializationStyle::FormExploded).unwrap(),
            Strategy::Object
        );
        assert!(matches!(
            select(&f.arena, one_of, SerializationStyle::Default).unwrap(),
            Strategy::Union { .. }
        ));
    }

    #[test]
    fn test_array_of_objects_never_uses_array_encoder() {
        let mut f = fixture();
        let obj = f.arena.insert(Shape::object(Vec::new())).unwrap();
        let arr = f.arena.insert(Shape::array(obj)).unwrap();
        assert!(matches!(
            select(&f.arena, arr, SerializationStyle::SimpleNonExploded).unwrap(),
            Strategy::Union { .. }
        ));
    }

    #[test]
    fn test_union_retry_and_null_flags() {
        let mut f = fixture();
        let nil = f.arena.scalar(PrimitiveType::Nil).unwrap();
        let with_string = f.arena.insert(Shape::union(vec![f.integer, f.string])).unwrap();
        let numeric = f.arena.insert(Shape::union(vec![f.integer, f.boolean, nil])).unwrap();
        assert_eq!(
            select(&f.arena, with_string, SerializationStyle::Default).unwrap(),
            Strategy::Union {
                retry_quoted: true,
                accepts_null: false
            }
        );
        assert_eq!(
            select(&f.arena, numeric, SerializationStyle::Default).unwrap(),
            Strategy::Union {
                retry_quoted: false,
                accepts_null: true
            }
        );
    }

    #[test]
    fn test_empty_union_unsupported() {
        let mut f = fixture();
        let empty = f.arena.insert(Shape::union(Vec::new())).unwrap();
        assert!(matches!(
            select(&f.arena, empty, SerializationStyle::Default),
            Err(ConfigError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_encode_scalar() {
        assert_eq!(encode_scalar(RawValue::Single("00123"), false), "123");
        assert_eq!(encode_scalar(RawValue::Single("abc"), true), r#""abc""#);
        assert_eq!(encode_scalar(RawValue::Null, true), "null");
        assert_eq!(encode_scalar(RawValue::Multi(&["1", "2"]), false), "[1,2]");
        assert_eq!(encode_scalar(RawValue::Multi(&["7"]), false), "7");
    }

    #[test]
    fn test_encode_array() {
        assert_eq!(
            encode_array(RawValue::Multi(&["A", "B"]), PrimitiveType::String),
            r#"["A","B"]"#
        );
        assert_eq!(
            encode_array(RawValue::Multi(&["1", "2"]), PrimitiveType::Integer),
            "[1,2]"
        );
        assert_eq!(
            encode_array(RawValue::Single("01,002,3"), PrimitiveType::Integer),
            "[1,2,3]"
        );
        assert_eq!(
            encode_array(RawValue::Single("x,y"), PrimitiveType::String),
            r#"["x","y"]"#
        );
    }

    #[test]
    fn test_encode_object_quotes_by_property_type() {
        let mut f = fixture();
        let obj = f
            .arena
            .insert(Shape::object(vec![
                Property::required("name", f.string),
                Property::optional("age", f.integer),
            ]))
            .unwrap();
        assert_eq!(
            encode_object(&f.arena, obj, RawValue::Single("name,Bob,age,042")).unwrap(),
            r#"{"name":"Bob","age":42}"#
        );
        assert_eq!(
            encode_object(&f.arena, obj, RawValue::Multi(&["age", "7"])).unwrap(),
            r#"{"age":7}"#
        );
    }

    #[test]
    fn test_encode_object_resolves_properties_through_combinators() {
        let mut f = fixture();
        let by_name = f
            .arena
            .insert(Shape::object(vec![Property::required("name", f.string)]))
            .unwrap();
        let by_id = f
            .arena
            .insert(Shape::object(vec![Property::required("id", f.integer)]))
            .unwrap();
        let one_of = f
            .arena
            .insert(Shape::object(Vec::new()).with_one_of(vec![by_name, by_id]))
            .unwrap();
        assert_eq!(
            encode_object(&f.arena, one_of, RawValue::Single("name,bob")).unwrap(),
            r#"{"name":"bob"}"#
        );
        assert_eq!(
            encode_object(&f.arena, one_of, RawValue::Multi(&["id", "007"])).unwrap(),
            r#"{"id":7}"#
        );
    }

    #[test]
    fn test_encode_object_quotes_nullable_scalars() {
        let mut f = fixture();
        let nil = f.arena.scalar(PrimitiveType::Nil).unwrap();
        let nullable_string = f.arena.insert(Shape::union(vec![f.string, nil])).unwrap();
        let nullable_int = f.arena.insert(Shape::union(vec![f.integer, nil])).unwrap();
        let obj = f
            .arena
            .insert(Shape::object(vec![
                Property::optional("nick", nullable_string),
                Property::optional("age", nullable_int),
            ]))
            .unwrap();
        assert_eq!(
            encode_object(&f.arena, obj, RawValue::Single("nick,bob,age,04")).unwrap(),
            r#"{"nick":"bob","age":4}"#
        );
    }

    #[test]
    fn test_nullable_string_items_retry_quoted() {
        let mut f = fixture();
        let nil = f.arena.scalar(PrimitiveType::Nil).unwrap();
        let nullable = f.arena.insert(Shape::union(vec![f.string, nil])).unwrap();
        let arr = f.arena.insert(Shape::array(nullable)).unwrap();
        let nested = f.arena.insert(Shape::union(vec![nullable, f.integer])).unwrap();
        for id in [arr, nested] {
            assert!(matches!(
                select(&f.arena, id, SerializationStyle::Default).unwrap(),
                Strategy::Union {
                    retry_quoted: true,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_encode_object_degrades_to_passthrough() {
        let mut f = fixture();
        let obj = f
            .arena
            .insert(Shape::object(vec![Property::required("name", f.string)]))
            .unwrap();
        assert_eq!(
            encode_object(&f.arena, obj, RawValue::Single("name,Bob,age")).unwrap(),
            "name,Bob,age"
        );
        assert_eq!(
            encode_object(&f.arena, obj, RawValue::Single("nick,7")).unwrap(),
            r#"{"nick":7}"#
        );
    }

    #[test]
    fn test_encode_structured() {
        assert_eq!(encode_structured(RawValue::Single("123abc"), false), "123abc");
        assert_eq!(encode_structured(RawValue::Single("123abc"), true), r#""123abc""#);
        assert_eq!(encode_structured(RawValue::Single("*ref"), false), r#""*ref""#);
        assert_eq!(
            encode_structured(RawValue::Multi(&["1", "a"]), false),
            "- 1\n- a\n"
        );
        assert_eq!(encode_structured(RawValue::Multi(&[]), false), "[]");
    }

    #[test]
    fn test_media_types() {
        assert_eq!(Strategy::Object.media_type(), MediaType::Json);
        assert_eq!(
            Strategy::Union {
                retry_quoted: false,
                accepts_null: false
            }
            .media_type(),
            MediaType::Yaml
        );
    }
}
