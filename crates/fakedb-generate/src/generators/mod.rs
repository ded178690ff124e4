//! Value generators, one per resolved field kind.

pub mod base;
pub mod collection;
pub mod generable;

use chrono::NaiveDateTime;
use rand::RngCore;
use serde_json::Value;

use fakedb_config::{FieldConfig, FieldSpec};

use crate::errors::GenerationError;

pub use base::BaseGenerator;
pub use collection::CollectionGenerator;
pub use generable::GenerableGenerator;

/// Generated value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl GeneratedValue {
    /// Convert a configured collection member.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => GeneratedValue::Null,
            Value::Bool(value) => GeneratedValue::Bool(*value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => GeneratedValue::Int(value),
                None => GeneratedValue::Float(number.as_f64().unwrap_or_default()),
            },
            Value::String(value) => GeneratedValue::Text(value.clone()),
            other => GeneratedValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    /// SQL literal: strings and timestamps quoted, numbers bare.
    pub fn to_sql(&self) -> String {
        match self {
            GeneratedValue::Null => "NULL".to_string(),
            GeneratedValue::Bool(true) => "TRUE".to_string(),
            GeneratedValue::Bool(false) => "FALSE".to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Float(value) => value.to_string(),
            GeneratedValue::Text(value) => quote_sql(value),
            GeneratedValue::Timestamp(value) => {
                quote_sql(&value.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }

    pub fn to_csv(&self) -> String {
        match self {
            GeneratedValue::Null => String::new(),
            GeneratedValue::Bool(value) => value.to_string(),
            GeneratedValue::Int(value) => value.to_string(),
            GeneratedValue::Float(value) => value.to_string(),
            GeneratedValue::Text(value) => value.clone(),
            GeneratedValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

fn quote_sql(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Sampler for one non-foreign-key column.
#[derive(Debug, Clone)]
pub enum ValueGenerator {
    Base(BaseGenerator),
    Collection(CollectionGenerator),
    Generable(GenerableGenerator),
}

impl ValueGenerator {
    pub fn from_config(field: &FieldConfig) -> Result<Self, GenerationError> {
        let generator = match &field.spec {
            FieldSpec::Base {
                kind,
                range,
                distribution,
            } => ValueGenerator::Base(BaseGenerator::new(*kind, *range, *distribution)?),
            FieldSpec::Collection {
                values,
                distribution,
            } => ValueGenerator::Collection(CollectionGenerator::new(values, *distribution)?),
            FieldSpec::Generable { generator } => {
                ValueGenerator::Generable(GenerableGenerator::new(generator)?)
            }
        };
        Ok(generator)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueGenerator::Base(generator) => generator.kind().as_str(),
            ValueGenerator::Collection(_) => "collection",
            ValueGenerator::Generable(_) => "generable",
        }
    }

    /// Produce `count` values.
    pub fn generate(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        match self {
            ValueGenerator::Base(generator) => generator.generate(count, rng),
            ValueGenerator::Collection(generator) => generator.generate(count, rng),
            ValueGenerator::Generable(generator) => Ok(generator.generate(count, rng)),
        }
    }
}
