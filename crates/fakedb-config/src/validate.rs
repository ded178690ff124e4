use std::collections::BTreeMap;

use fakedb_core::Schema;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{parse_entry, sample_count};
use crate::errors::{ConfigError, ConfigPath, Result};
use crate::model::FieldOverride;

/// User overrides for one table.
#[derive(Debug, Clone, Default)]
pub struct TableOverrides {
    /// Table-wide sample count from a numeric `samples` entry.
    pub samples: Option<usize>,
    pub columns: BTreeMap<String, FieldOverride>,
}

impl TableOverrides {
    pub fn column(&self, name: &str) -> Option<&FieldOverride> {
        self.columns.get(name)
    }
}

/// Validated `schema` section of a configuration.
#[derive(Debug, Clone, Default)]
pub struct SchemaOverrides {
    tables: BTreeMap<String, TableOverrides>,
}

impl SchemaOverrides {
    /// Check every table and column under `schema` exists in the parsed schema
    /// and that each column override is well-formed.
    pub fn from_config(config: &Value, schema: &Schema) -> Result<Self> {
        let root = ConfigPath::new(["schema"]);
        let section = match config.get("schema") {
            None | Some(Value::Null) => {
                debug!("no table overrides provided");
                return Ok(Self::default());
            }
            Some(Value::Object(section)) => section,
            Some(other) => {
                return Err(ConfigError::configuration(
                    &root,
                    format!("expected an object of tables, found {other}"),
                ));
            }
        };

        let mut tables = BTreeMap::new();
        for (table_name, raw_table) in section {
            let table_path = root.join(table_name.as_str());
            let table = schema.table(table_name).ok_or_else(|| {
                ConfigError::configuration(
                    &table_path,
                    format!("the table {table_name} is not present in the schema"),
                )
            })?;
            let raw_table = raw_table.as_object().ok_or_else(|| {
                ConfigError::configuration(&table_path, "expected an object of columns")
            })?;

            let mut overrides = TableOverrides::default();
            for (column_name, raw_column) in raw_table {
                let column_path = table_path.join(column_name.as_str());
                if column_name == "samples" && raw_column.is_number() {
                    let samples = raw_column.as_u64().ok_or_else(|| {
                        ConfigError::configuration(
                            &column_path,
                            "samples must be a non-negative integer",
                        )
                    })?;
                    overrides.samples = sample_count(Some(samples), &table_path)?;
                    continue;
                }
                if !table.has_column(column_name) {
                    return Err(ConfigError::configuration(
                        &column_path,
                        format!("the table {table_name} has no column {column_name} in the schema"),
                    ));
                }
                let field: FieldOverride = parse_entry(raw_column, &column_path)?;
                overrides.columns.insert(column_name.clone(), field);
            }
            debug!(
                table = %table_name,
                columns = overrides.columns.len(),
                samples = ?overrides.samples,
                "table overrides validated"
            );
            tables.insert(table_name.clone(), overrides);
        }

        Ok(Self { tables })
    }

    pub fn table(&self, name: &str) -> Option<&TableOverrides> {
        self.tables.get(name)
    }
}
