//! # Parameter
//!
//! Validation capability for one query parameter, header, or path segment.

use std::fmt;
use std::sync::Arc;

use wirecheck_core::{ConfigError, Outcome, SerializationStyle, ShapeId};

use crate::engine::ValidationEngine;
use crate::strategy::{RawValue, Strategy};

/// A declared parameter bound to its shape and selected strategy.
#[derive(Clone)]
pub struct Parameter {
    engine: Arc<ValidationEngine>,
    name: String,
    shape: ShapeId,
    style: SerializationStyle,
    strategy: Strategy,
    required: bool,
    /// Array whose wire form repeats the parameter once per item.
    repeated: bool,
}

impl Parameter {
    pub(crate) fn new(
        engine: Arc<ValidationEngine>,
        name: String,
        shape: ShapeId,
        style: SerializationStyle,
        strategy: Strategy,
        required: bool,
        repeated: bool,
    ) -> Self {
        Self {
            engine,
            name,
            shape,
            style,
            strategy,
            required,
            repeated,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn style(&self) -> SerializationStyle {
        self.style
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// True for array parameters sent as one wire value per item, where a
    /// single value is still a one-item array. Comma-joined
    /// (`SimpleNonExploded`) arrays are not repeated.
    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    /// Full outcome for a single raw value. `None` is a null value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only for configuration defects, such as a
    /// shape that cannot produce a validator. A non-conforming value is
    /// `Ok` with `conforms == false`.
    pub fn report(&self, raw: Option<&str>) -> Result<Outcome, ConfigError> {
        self.strategy.run(&self.engine, self.shape, RawValue::from(raw))
    }

    /// Full outcome for a repeated parameter.
    pub fn report_array<S: AsRef<str>>(&self, values: &[S]) -> Result<Outcome, ConfigError> {
        let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        self.strategy
            .run(&self.engine, self.shape, RawValue::Multi(&values))
    }

    pub fn validate(&self, raw: Option<&str>) -> Result<bool, ConfigError> {
        Ok(self.report(raw)?.conforms)
    }

    /// First diagnostic message, or `"OK"`.
    pub fn message(&self, raw: Option<&str>) -> Result<String, ConfigError> {
        Ok(self.report(raw)?.message())
    }

    pub fn validate_array<S: AsRef<str>>(&self, values: &[S]) -> Result<bool, ConfigError> {
        Ok(self.report_array(values)?.conforms)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("style", &self.style)
            .field("strategy", &self.strategy)
            .field("required", &self.required)
            .field("repeated", &self.repeated)
            .finish()
    }
}
