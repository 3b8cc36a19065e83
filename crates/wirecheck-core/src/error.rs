//! # Error Types
//!
//! Configuration-class errors raised while wiring shapes to validators.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - A value that fails its schema is never an error. Non-conformance is a
//!   successfully computed [`Outcome`](crate::Outcome) with `conforms = false`.
//! - Everything in [`ConfigError`] is a deployment-time defect: a shape that
//!   cannot be classified, a shape that cannot produce a validator, or an
//!   unreadable engine configuration. These propagate to the caller as `Err`.

use thiserror::Error;

use crate::shape::ShapeId;

/// Error raised when shapes, validators, or engine settings are misconfigured.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A shape id does not refer to any shape in the arena.
    #[error("unknown shape {0}")]
    UnknownShape(ShapeId),

    /// The shape cannot be classified or encoded by any strategy.
    #[error("unsupported shape '{shape}': {reason}")]
    UnsupportedShape {
        /// Shape name or id.
        shape: String,
        /// Why no strategy applies.
        reason: String,
    },

    /// The shape could not produce a validator for the requested media type.
    #[error("no validator for shape '{shape}' as {media_type}: {reason}")]
    ValidatorUnavailable {
        /// Shape name or id.
        shape: String,
        /// Media type the validator was requested for.
        media_type: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
