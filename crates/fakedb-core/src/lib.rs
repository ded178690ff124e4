//! Core contracts and helpers for fakedb.
//!
//! This crate defines the parsed schema types consumed by the generation
//! pipeline, schema validation, and the table dependency graph.

pub mod error;
pub mod graph;
pub mod references;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use graph::{DependencyGraph, GraphSummary};
pub use references::{Cardinality, Reference, ReferenceSides};
pub use schema::{Column, Schema, Table};
pub use types::EnumType;
pub use validation::validate_schema;
