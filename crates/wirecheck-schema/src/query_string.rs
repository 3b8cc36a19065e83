//! # Query String
//!
//! Validation capability for a whole query string declared as an object
//! shape, or as a union of object shapes.
//!
//! A query string conforms when:
//!
//! 1. the supplied parameter names are accepted by a [`PropertyGroup`]
//!    (the first acceptable group in declaration order wins), **and**
//! 2. every supplied value of a property declared by that group conforms
//!    to its property shape.
//!
//! Undeclared names that the winning group tolerates are not checked.

use std::collections::BTreeMap;
use std::sync::Arc;

use wirecheck_core::{
    select_group, ConfigError, Diagnostic, Outcome, PropertyGroup, SerializationStyle, ShapeDef, ShapeId,
};

use crate::engine::ValidationEngine;
use crate::parameter::Parameter;

/// Flattened query parameters: name to values in wire order.
pub type QueryParams = BTreeMap<String, Vec<String>>;

/// A query string bound to its property groups.
#[derive(Debug, Clone)]
pub struct QueryString {
    shape: ShapeId,
    groups: Vec<PropertyGroup>,
    /// Property parameters per group, parallel to `groups`.
    members: Vec<BTreeMap<String, Parameter>>,
}

impl QueryString {
    pub(crate) fn new(engine: &Arc<ValidationEngine>, shape: ShapeId, style: SerializationStyle) -> Result<Self, ConfigError> {
        let arena = engine.shapes();
        let alternatives = match &arena.get(shape)?.def {
            ShapeDef::Object { .. } => vec![shape],
            ShapeDef::Union { alternatives } if !alternatives.is_empty() => alternatives.clone(),
            _ => {
                return Err(ConfigError::UnsupportedShape {
                    shape: arena.label(shape),
                    reason: "a query string must be an object or a union of objects".to_string(),
                });
            }
        };

        let mut groups = Vec::with_capacity(alternatives.len());
        let mut members = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            groups.push(PropertyGroup::from_object(arena, alternative)?);
            let mut parameters = BTreeMap::new();
            for property in arena.get(alternative)?.properties() {
                let parameter = engine.parameter(
                    property.name.clone(),
                    property.shape,
                    style,
                    property.required,
                )?;
                parameters.insert(property.name.clone(), parameter);
            }
            members.push(parameters);
        }

        Ok(Self {
            shape,
            groups,
            members,
        })
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    /// Property groups in declaration order.
    pub fn groups(&self) -> &[PropertyGroup] {
        &self.groups
    }

    /// Every declared property parameter by name. When several groups
    /// declare the same name, the first declaration wins.
    pub fn facets(&self) -> BTreeMap<&str, &Parameter> {
        let mut facets = BTreeMap::new();
        for parameters in &self.members {
            for (name, parameter) in parameters {
                facets.entry(name.as_str()).or_insert(parameter);
            }
        }
        facets
    }

    /// The group the supplied names select, if any.
    pub fn matched_group(&self, params: &QueryParams) -> Option<&PropertyGroup> {
        select_group(params.keys().map(String::as_str), &self.groups).map(|i| &self.groups[i])
    }

    /// Full outcome. Value diagnostics are prefixed with the parameter name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only for configuration defects.
    pub fn report(&self, params: &QueryParams) -> Result<Outcome, ConfigError> {
        let Some(index) = select_group(params.keys().map(String::as_str), &self.groups) else {
            return Ok(Outcome::rejected(vec![Diagnostic::root(
                "query parameters match no declared property group",
            )]));
        };

        let mut conforms = true;
        let mut diagnostics = Vec::new();
        for (name, values) in params {
            let Some(parameter) = self.members[index].get(name) else {
                continue;
            };
            let outcome = match values.as_slice() {
                [] => parameter.report(None)?,
                [value] if !parameter.is_repeated() => parameter.report(Some(value))?,
                many => parameter.report_array(many)?,
            };
            conforms &= outcome.conforms;
            let prefix = format!("/{}", escape_pointer(name));
            diagnostics.extend(outcome.diagnostics.into_iter().map(|d| Diagnostic {
                instance_path: format!("{prefix}{}", d.instance_path),
                ..d
            }));
        }

        if conforms {
            Ok(Outcome::conforming())
        } else {
            Ok(Outcome::rejected(diagnostics))
        }
    }

    pub fn validate(&self, params: &QueryParams) -> Result<bool, ConfigError> {
        Ok(self.report(params)?.conforms)
    }
}

fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
