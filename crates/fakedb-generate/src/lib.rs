//! Fake relational data generation for fakedb.
//!
//! Compiles a resolved configuration into per-table directives ordered by
//! foreign-key dependencies, samples values from distributions and regex
//! generators, and renders the rows as SQL or CSV.

pub mod compiler;
pub mod directive;
pub mod distribution;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;

pub use compiler::{compile, extract_foreign_keys, hash_seed};
pub use directive::{Dependency, Directive, DirectiveId, DirectiveSet, TableData};
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use generators::{GeneratedValue, ValueGenerator};
pub use model::{GenerateOptions, GenerationIssue, GenerationReport, TableReport};
pub use output::{Formatter, OutputFormat, RenderedOutput, RenderedTable, render};
