//! # Property Groups
//!
//! A query string declared as a union of object shapes is matched against
//! one named property set per alternative. Groups are tried in declaration
//! order and the first acceptable one wins, so order is significant.
//!
//! Matching a group only says the supplied *names* fit. Whether each value
//! conforms to its property shape is checked separately.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shape::{ShapeArena, ShapeDef, ShapeId};

/// One alternative set of query-string properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub name: String,
    pub required: BTreeSet<String>,
    pub declared: BTreeSet<String>,
    pub additional_properties: bool,
}

impl PropertyGroup {
    /// Build a group from an object shape.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedShape` if the shape is not an object.
    pub fn from_object(arena: &ShapeArena, id: ShapeId) -> Result<Self, ConfigError> {
        let shape = arena.get(id)?;
        let ShapeDef::Object {
            properties,
            additional_properties,
        } = &shape.def
        else {
            return Err(ConfigError::UnsupportedShape {
                shape: arena.label(id),
                reason: "query-string groups must be object shapes".to_string(),
            });
        };
        Ok(Self {
            name: arena.label(id),
            required: properties
                .iter()
                .filter(|p| p.required)
                .map(|p| p.name.clone())
                .collect(),
            declared: properties.iter().map(|p| p.name.clone()).collect(),
            additional_properties: *additional_properties,
        })
    }

    /// Whether a set of supplied parameter names satisfies this group.
    pub fn accepts<'a, I>(&self, supplied: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let supplied: BTreeSet<&str> = supplied.into_iter().collect();
        let has_required = self.required.iter().all(|r| supplied.contains(r.as_str()));
        has_required
            && (self.additional_properties || supplied.iter().all(|s| self.declared.contains(*s)))
    }
}

/// Index of the first group accepting the supplied names.
pub fn select_group<'a, I>(supplied: I, groups: &[PropertyGroup]) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let supplied: Vec<&str> = supplied.into_iter().collect();
    groups
        .iter()
        .position(|g| g.accepts(supplied.iter().copied()))
}

/// Whether any group accepts the supplied names.
pub fn matches_any<'a, I>(supplied: I, groups: &[PropertyGroup]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    select_group(supplied, groups).is_some()
}
