//! Configuration resolution for fakedb.
//!
//! Merges the built-in defaults with a user document, validates the type
//! catalogs and table overrides, and resolves one `FieldConfig` per schema
//! column.

pub mod bounds;
pub mod catalog;
pub mod defaults;
pub mod errors;
pub mod load;
pub mod merge;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod validate;

pub use catalog::{CatalogMatch, GENERATOR_MAX_REPEAT, TypeCatalog};
pub use defaults::default_config;
pub use errors::{ConfigError, ConfigPath, Result, ValidationIssue};
pub use load::load_config_file;
pub use merge::merge_configs;
pub use model::{
    BaseKind, ConfigDocument, DEFAULT_SAMPLES, DistributionShape, DistributionSpec, FieldConfig,
    FieldSpec, ResolvedConfig, TableConfig, ValueRange,
};
pub use resolve::resolve;
pub use schema::config_json_schema;
pub use validate::{SchemaOverrides, TableOverrides};
