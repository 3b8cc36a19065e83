//! # Serialization Styles
//!
//! How an array or object parameter is laid out on the wire. OpenAPI
//! describes this with the `style` and `explode` facets; RAML has no such
//! facets and always uses [`SerializationStyle::Default`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a parameter appears in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    /// The OpenAPI default `style` for this location.
    pub fn default_style(self) -> &'static str {
        match self {
            Self::Query | Self::Cookie => "form",
            Self::Header | Self::Path => "simple",
        }
    }
}

/// Wire serialization convention for a parameter value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerializationStyle {
    /// `style: simple`, `explode: false`. Arrays are `a,b,c`; objects are `k,v,k,v`.
    SimpleNonExploded,
    /// `style: form`, `explode: true`. Arrays repeat the parameter per value.
    FormExploded,
    /// No OpenAPI serialization rules apply.
    #[default]
    Default,
}

impl SerializationStyle {
    /// Derive the style from OpenAPI facets, filling absent facets with the
    /// defaults for `location`.
    pub fn from_oas(location: ParameterLocation, style: Option<&str>, explode: Option<bool>) -> Self {
        let style = style.unwrap_or_else(|| location.default_style());
        // `explode` defaults to true only for form style.
        let explode = explode.unwrap_or(style == "form");
        match (style, explode) {
            ("simple", false) => Self::SimpleNonExploded,
            ("form", true) => Self::FormExploded,
            _ => Self::Default,
        }
    }

    /// True for the two OpenAPI conventions with per-shape encoders.
    pub fn is_oas(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl fmt::Display for SerializationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SimpleNonExploded => "simple-non-exploded",
            Self::FormExploded => "form-exploded",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}
