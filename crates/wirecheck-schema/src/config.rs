//! # Engine Configuration
//!
//! Settings for the JSON Schema back-end, loadable from YAML:
//!
//! ```yaml
//! draft: draft2020-12
//! validate_formats: true
//! media_types:
//!   - application/json
//!   - application/yaml
//! ```
//!
//! Every field is optional; absent fields take the [`Default`] values.

use serde::{Deserialize, Serialize};
use wirecheck_core::{ConfigError, MediaType};

/// JSON Schema draft used to compile rendered shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaDraft {
    #[serde(rename = "draft7")]
    Draft7,
    #[serde(rename = "draft2019-09")]
    Draft201909,
    #[default]
    #[serde(rename = "draft2020-12")]
    Draft202012,
}

impl SchemaDraft {
    pub(crate) fn to_jsonschema(self) -> jsonschema::Draft {
        match self {
            Self::Draft7 => jsonschema::Draft::Draft7,
            Self::Draft201909 => jsonschema::Draft::Draft201909,
            Self::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// Back-end settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub draft: SchemaDraft,
    /// Enforce `format` keywords such as `date-time`.
    pub validate_formats: bool,
    /// Media types validators may be built for.
    pub media_types: Vec<MediaType>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            draft: SchemaDraft::default(),
            validate_formats: true,
            media_types: vec![MediaType::Json, MediaType::Yaml],
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfig` if the text is not valid YAML or
    /// has unknown or mistyped fields.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }

    pub fn supports(&self, media_type: MediaType) -> bool {
        self.media_types.contains(&media_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.draft, SchemaDraft::Draft202012);
        assert!(config.validate_formats);
        assert!(config.supports(MediaType::Json));
        assert!(config.supports(MediaType::Yaml));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml_str(
            "draft: draft7\nmedia_types:\n  - application/json\n",
        )
        .unwrap();
        assert_eq!(config.draft, SchemaDraft::Draft7);
        assert!(config.validate_formats);
        assert!(config.supports(MediaType::Json));
        assert!(!config.supports(MediaType::Yaml));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_yaml_str("strict: true\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_draft_rejected() {
        let err = EngineConfig::from_yaml_str("draft: draft3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }
}
