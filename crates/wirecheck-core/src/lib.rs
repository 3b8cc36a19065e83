//! # wirecheck-core — Shapes, Quoting, and Outcomes
//!
//! Foundational types for validating wire parameters against declared
//! schemas. At the HTTP boundary a parameter is only a string (or a list of
//! strings); validators want typed documents. This crate holds the pieces
//! that decide how a string becomes a typed literal, without depending on
//! any particular validator.
//!
//! ## Contents
//!
//! 1. **Shape model.** [`ShapeArena`] owns every compiled [`Shape`]; shapes
//!    reference each other by [`ShapeId`].
//!
//! 2. **Classification.** [`classify`] reduces a shape to a [`ShapeKind`],
//!    flagging combinator-bearing shapes as aggregates.
//!
//! 3. **Quoting policy.** [`needs_quotes`] and [`preprocess`] turn a raw
//!    value into a literal: strings are quoted and escaped, numbers lose
//!    insignificant leading zeros.
//!
//! 4. **Styles.** [`SerializationStyle`] captures the OpenAPI `style` /
//!    `explode` conventions that decide how multi-valued parameters look.
//!
//! 5. **Property groups.** [`PropertyGroup`] and [`select_group`] match the
//!    names of a flattened query string against alternative property sets.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wirecheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod classify;
pub mod error;
pub mod group;
pub mod outcome;
pub mod quoting;
pub mod shape;
pub mod style;

// Re-export primary types for ergonomic imports.
pub use classify::{classify, scalar_items, structural_kind, ShapeKind};
pub use error::ConfigError;
pub use group::{matches_any, select_group, PropertyGroup};
pub use outcome::{Diagnostic, MediaType, Outcome};
pub use quoting::{encode_literal, needs_quotes, preprocess, quote, strip_leading_zeros};
pub use shape::{Combinators, PrimitiveType, Property, Shape, ShapeArena, ShapeDef, ShapeId};
pub use style::{ParameterLocation, SerializationStyle};
