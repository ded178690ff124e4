use fakedb_config::ConfigError;
use thiserror::Error;

/// Errors emitted while compiling or executing generation directives.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid schema: {0}")]
    Schema(#[from] fakedb_core::Error),
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),
    #[error("unresolvable dependency: {0}")]
    UnresolvableDependency(String),
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("unknown field '{field}' in table '{table}'")]
    UnknownField { table: String, field: String },
    #[error("row count of table '{table}' overflows")]
    RowCountOverflow { table: String },
    #[error("invalid generator: {0}")]
    InvalidGenerator(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
