use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ConfigError, ConfigPath, ValidationIssue};

/// Sample count used when neither the column nor its type sets one.
pub const DEFAULT_SAMPLES: usize = 10;

/// Root of a configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConfigDocument {
    /// Per-table, per-column overrides. A numeric `samples` entry under a
    /// table applies to every column of that table.
    #[serde(default)]
    pub schema: Option<BTreeMap<String, BTreeMap<String, Value>>>,
    /// Reusable type catalogs.
    #[serde(default)]
    pub data_types: Option<DataTypes>,
}

/// The three type catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DataTypes {
    #[serde(default)]
    pub base_types: BTreeMap<String, BaseTypeEntry>,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionEntry>,
    #[serde(default)]
    pub generables: BTreeMap<String, GenerableEntry>,
}

/// Inclusive `[start, end]` bounds. Numbers for numeric kinds, ISO-8601
/// strings for datetimes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ValueBounds {
    pub start: Value,
    pub end: Value,
}

/// Distribution block: `{"type": "normal" | "log", "config": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DistributionEntry {
    #[serde(rename = "type")]
    pub shape: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BaseTypeEntry {
    pub value: Option<ValueBounds>,
    pub samples: Option<u64>,
    pub distribution: Option<DistributionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CollectionEntry {
    pub pattern: Option<String>,
    pub values: Option<Vec<Value>>,
    pub samples: Option<u64>,
    pub priority: Option<i64>,
    pub distribution: Option<DistributionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GenerableEntry {
    pub pattern: Option<String>,
    pub generator: Option<String>,
    pub samples: Option<u64>,
    pub priority: Option<i64>,
    /// Accepted for compatibility; generables never consult a distribution.
    pub distribution: Option<Value>,
}

/// Column-level override under `schema.<table>.<column>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FieldOverride {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub value: Option<ValueBounds>,
    pub values: Option<Vec<Value>>,
    pub generator: Option<String>,
    pub pattern: Option<String>,
    pub samples: Option<u64>,
    pub priority: Option<i64>,
    pub distribution: Option<Value>,
}

/// Base kinds understood by the value generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseKind {
    Integer,
    Float,
    Boolean,
    Datetime,
}

impl BaseKind {
    /// Map a configured or declared type name onto a base kind.
    ///
    /// Matching is case-insensitive and ignores a parenthesised suffix.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let normalized = name
            .split('(')
            .next()
            .unwrap_or(name)
            .trim()
            .to_lowercase();
        match normalized.as_str() {
            "int" | "integer" | "smallint" | "bigint" | "int2" | "int4" | "int8" | "serial"
            | "bigserial" => Some(BaseKind::Integer),
            "float" | "double" | "real" | "decimal" | "numeric" | "float4" | "float8" => {
                Some(BaseKind::Float)
            }
            "bool" | "boolean" => Some(BaseKind::Boolean),
            "datetime" | "timestamp" | "timestamptz" | "date" => Some(BaseKind::Datetime),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BaseKind::Integer => "int",
            BaseKind::Float => "float",
            BaseKind::Boolean => "boolean",
            BaseKind::Datetime => "datetime",
        }
    }
}

/// Named probability shape sampled by the distribution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionShape {
    Normal,
    Log,
}

impl DistributionShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "normal" => Some(DistributionShape::Normal),
            "log" => Some(DistributionShape::Log),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistributionShape::Normal => "normal",
            DistributionShape::Log => "log",
        }
    }
}

/// Validated distribution settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionSpec {
    pub shape: DistributionShape,
    /// Shape parameter of the log-normal; unused by `normal`.
    pub sigma: f64,
}

impl Default for DistributionSpec {
    fn default() -> Self {
        Self {
            shape: DistributionShape::Normal,
            sigma: 1.0,
        }
    }
}

impl DistributionSpec {
    /// Validate a raw distribution block found at `path`.
    pub fn from_entry(
        entry: &DistributionEntry,
        path: &ConfigPath,
        warnings: &mut Vec<ValidationIssue>,
    ) -> Result<Self, ConfigError> {
        let shape_name = entry.shape.as_deref().unwrap_or_default();
        let shape = DistributionShape::parse(shape_name).ok_or_else(|| {
            ConfigError::configuration(
                &path.join("type"),
                format!("unknown distribution '{shape_name}', expected normal or log"),
            )
        })?;

        let mut spec = DistributionSpec {
            shape,
            ..DistributionSpec::default()
        };

        let Some(config) = entry.config.as_ref().filter(|config| !config.is_null()) else {
            return Ok(spec);
        };
        let config_path = path.join("config");
        let Some(config) = config.as_object() else {
            return Err(ConfigError::configuration(
                &config_path,
                "distribution config must be an object or null",
            ));
        };

        for (key, value) in config {
            match (shape, key.as_str()) {
                (DistributionShape::Log, "sigma") => {
                    let sigma = value.as_f64().filter(|sigma| *sigma > 0.0 && sigma.is_finite());
                    spec.sigma = sigma.ok_or_else(|| {
                        ConfigError::configuration(
                            &config_path.join("sigma"),
                            "sigma must be a positive number",
                        )
                    })?;
                }
                _ => warnings.push(ValidationIssue::new(
                    "distribution_config_ignored",
                    &config_path.join(key.as_str()),
                    format!("'{key}' has no effect on the {} distribution", shape.as_str()),
                    None,
                )),
            }
        }

        Ok(spec)
    }
}

/// Inclusive value range of a base field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    Numeric { start: f64, end: f64 },
    Temporal { start: NaiveDateTime, end: NaiveDateTime },
}

/// Kind-specific payload of a resolved field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    Base {
        kind: BaseKind,
        range: ValueRange,
        distribution: DistributionSpec,
    },
    Collection {
        values: Vec<Value>,
        distribution: DistributionSpec,
    },
    Generable {
        generator: String,
    },
}

impl FieldSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldSpec::Base { kind, .. } => kind.as_str(),
            FieldSpec::Collection { .. } => "collection",
            FieldSpec::Generable { .. } => "generable",
        }
    }
}

/// Fully resolved configuration for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub name: String,
    pub samples: usize,
    pub spec: FieldSpec,
}

/// Resolved configuration for one table, fields in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
}

impl TableConfig {
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The table-wide sample count; every field must agree on it.
    pub fn sample_count(&self) -> Result<usize, ConfigError> {
        self.agreed_samples(self.fields.iter())
    }

    /// Sample count agreed by the fields not listed in `excluded`.
    ///
    /// Falls back to every field when all of them are excluded.
    pub fn sample_count_excluding(&self, excluded: &[&str]) -> Result<usize, ConfigError> {
        let mut remaining = self
            .fields
            .iter()
            .filter(|field| !excluded.contains(&field.name.as_str()))
            .peekable();
        if remaining.peek().is_none() {
            return self.sample_count();
        }
        self.agreed_samples(remaining)
    }

    fn agreed_samples<'a>(
        &self,
        mut fields: impl Iterator<Item = &'a FieldConfig>,
    ) -> Result<usize, ConfigError> {
        let Some(first) = fields.next() else {
            return Ok(0);
        };
        if let Some(other) = fields.find(|field| field.samples != first.samples) {
            return Err(ConfigError::configuration(
                &ConfigPath::new(["schema", self.name.as_str()]),
                format!(
                    "fields disagree on sample count ({} has {}, {} has {}); set `samples` on the table",
                    first.name, first.samples, other.name, other.samples
                ),
            ));
        }
        Ok(first.samples)
    }
}

/// Output of the resolver: one `TableConfig` per schema table, in schema order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub tables: Vec<TableConfig>,
    pub warnings: Vec<ValidationIssue>,
}

impl ResolvedConfig {
    pub fn table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|table| table.name == name)
    }
}
