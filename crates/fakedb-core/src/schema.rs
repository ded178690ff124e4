use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::references::Reference;
use crate::types::EnumType;

/// Parsed schema description consumed by the generation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    /// Tables in declaration order.
    pub tables: Vec<Table>,
    /// Enumerated types declared alongside the tables.
    #[serde(default)]
    pub enums: Vec<EnumType>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Iterate over every reference declared by every table.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.tables.iter().flat_map(|table| table.references.iter())
    }
}

/// A table with ordered columns and its foreign-key references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }
}

/// Column name and declared type as written in the schema description.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    /// Declared type name (e.g. `int`, `varchar(255)`, or an enum name).
    #[serde(rename = "type")]
    pub column_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}
