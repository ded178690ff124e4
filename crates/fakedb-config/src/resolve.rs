use fakedb_core::{Column, Schema};
use serde_json::Value;
use tracing::{debug, info};

use crate::bounds::parse_range;
use crate::catalog::{
    CatalogMatch, CollectionType, GenerableType, TypeCatalog, check_generator, compile_pattern,
    inject_enum_collections, parse_entry, sample_count, warn_generable_distribution,
};
use crate::errors::{ConfigError, ConfigPath, Result, ValidationIssue};
use crate::merge::merge_configs;
use crate::model::{
    BaseKind, DEFAULT_SAMPLES, DistributionEntry, DistributionSpec, FieldConfig, FieldOverride,
    FieldSpec, ResolvedConfig, TableConfig,
};
use crate::validate::{SchemaOverrides, TableOverrides};

/// Merge `user` over `default`, validate the result against `schema` and
/// produce one `FieldConfig` per column.
///
/// Nothing is returned unless every table and column resolves.
pub fn resolve(schema: &Schema, user: &Value, default: &Value) -> Result<ResolvedConfig> {
    let mut merged = merge_configs(default, user);
    inject_enum_collections(&mut merged, &schema.enums);

    let mut warnings = Vec::new();
    let catalog = TypeCatalog::from_config(&merged, &mut warnings)?;
    let overrides = SchemaOverrides::from_config(&merged, schema)?;

    let mut tables = Vec::with_capacity(schema.tables.len());
    for table in &schema.tables {
        let table_overrides = overrides.table(&table.name);
        let mut fields = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let path = ConfigPath::new(["schema", table.name.as_str(), column.name.as_str()]);
            let resolver = FieldResolver {
                column,
                table_overrides,
                catalog: &catalog,
                path,
            };
            let field = resolver.resolve(&mut warnings)?;
            debug!(
                table = %table.name,
                column = %column.name,
                kind = field.spec.kind_name(),
                samples = field.samples,
                "field resolved"
            );
            fields.push(field);
        }
        tables.push(TableConfig {
            name: table.name.clone(),
            fields,
        });
    }

    info!(
        tables = tables.len(),
        warnings = warnings.len(),
        "configuration resolved"
    );
    Ok(ResolvedConfig { tables, warnings })
}

struct FieldResolver<'a> {
    column: &'a Column,
    table_overrides: Option<&'a TableOverrides>,
    catalog: &'a TypeCatalog,
    path: ConfigPath,
}

impl<'a> FieldResolver<'a> {
    fn field_override(&self) -> Option<&'a FieldOverride> {
        self.table_overrides
            .and_then(|overrides| overrides.column(&self.column.name))
    }

    fn resolve(&self, warnings: &mut Vec<ValidationIssue>) -> Result<FieldConfig> {
        let field_override = self.field_override();
        let explicit_type = field_override.and_then(|field| field.type_name.as_deref());
        let matched = self
            .catalog
            .find_match(&self.column.name, &self.column.column_type);
        let field_type = explicit_type
            .or(matched.as_ref().map(CatalogMatch::name))
            .unwrap_or(&self.column.column_type);

        let has_values = field_override.is_some_and(|field| field.values.is_some());
        let has_generator = field_override.is_some_and(|field| field.generator.is_some());

        let spec_and_samples = if let Some(kind) = BaseKind::from_type_name(field_type) {
            self.base(kind, warnings)?
        } else if field_type == "collection" || has_values {
            self.collection(self.catalog.collection(field_type), warnings)?
        } else if let Some(entry) = self.catalog.collection(field_type) {
            self.collection(Some(entry), warnings)?
        } else if field_type == "generable" || has_generator {
            self.generable(self.catalog.generable(field_type), warnings)?
        } else if let Some(entry) = self.catalog.generable(field_type) {
            self.generable(Some(entry), warnings)?
        } else if let Some(entry) = self.catalog.find_collection(&self.column.name, field_type) {
            self.collection(Some(entry), warnings)?
        } else if let Some(entry) = self.catalog.find_generable(&self.column.name, field_type) {
            self.generable(Some(entry), warnings)?
        } else {
            let path = match explicit_type {
                Some(_) => self.path.join("type"),
                None => self.path.clone(),
            };
            return Err(ConfigError::unrecognized_type(&path, field_type));
        };

        let (spec, samples) = spec_and_samples;
        self.reject_foreign_payload(&spec)?;
        Ok(FieldConfig {
            name: self.column.name.clone(),
            samples,
            spec,
        })
    }

    /// Fail on override keys that carry another kind's payload.
    fn reject_foreign_payload(&self, spec: &FieldSpec) -> Result<()> {
        let Some(field) = self.field_override() else {
            return Ok(());
        };
        let present = [
            ("value", field.value.is_some()),
            ("values", field.values.is_some()),
            ("generator", field.generator.is_some()),
            ("pattern", field.pattern.is_some()),
            ("priority", field.priority.is_some()),
        ];
        let allowed: &[&str] = match spec {
            FieldSpec::Base { .. } => &["value"],
            FieldSpec::Collection { .. } => &["values", "pattern", "priority"],
            FieldSpec::Generable { .. } => &["generator", "pattern", "priority"],
        };
        for (key, is_set) in present {
            if is_set && !allowed.contains(&key) {
                return Err(ConfigError::configuration(
                    &self.path.join(key),
                    format!(
                        "\"{key}\" does not apply to a {} column",
                        spec.kind_name()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Column override, then table-wide count, then catalog entry, then default.
    fn samples(&self, catalog_samples: Option<usize>) -> Result<usize> {
        let column_samples = sample_count(
            self.field_override().and_then(|field| field.samples),
            &self.path,
        )?;
        Ok(column_samples
            .or(self.table_overrides.and_then(|overrides| overrides.samples))
            .or(catalog_samples)
            .unwrap_or(DEFAULT_SAMPLES))
    }

    fn override_distribution(
        &self,
        warnings: &mut Vec<ValidationIssue>,
    ) -> Result<Option<DistributionSpec>> {
        let Some(raw) = self.field_override().and_then(|field| field.distribution.as_ref()) else {
            return Ok(None);
        };
        let path = self.path.join("distribution");
        let entry: DistributionEntry = parse_entry(raw, &path)?;
        DistributionSpec::from_entry(&entry, &path, warnings).map(Some)
    }

    fn check_override_pattern(&self) -> Result<()> {
        if let Some(pattern) = self.field_override().and_then(|field| field.pattern.as_deref()) {
            compile_pattern(Some(pattern), &self.path)?;
        }
        Ok(())
    }

    fn base(
        &self,
        kind: BaseKind,
        warnings: &mut Vec<ValidationIssue>,
    ) -> Result<(FieldSpec, usize)> {
        let catalog_entry = self.catalog.base_type(kind);
        let range = match self.field_override().and_then(|field| field.value.as_ref()) {
            Some(bounds) => parse_range(kind, bounds, &self.path.join("value"))?,
            None => catalog_entry.map(|entry| entry.range).ok_or_else(|| {
                ConfigError::configuration(
                    &self.path,
                    format!("no value range configured for base type {}", kind.as_str()),
                )
            })?,
        };
        let distribution = self
            .override_distribution(warnings)?
            .or(catalog_entry.and_then(|entry| entry.distribution))
            .unwrap_or_default();
        let samples = self.samples(catalog_entry.and_then(|entry| entry.samples))?;
        Ok((
            FieldSpec::Base {
                kind,
                range,
                distribution,
            },
            samples,
        ))
    }

    fn collection(
        &self,
        catalog_entry: Option<&CollectionType>,
        warnings: &mut Vec<ValidationIssue>,
    ) -> Result<(FieldSpec, usize)> {
        self.check_override_pattern()?;
        let values = self
            .field_override()
            .and_then(|field| field.values.clone())
            .or_else(|| catalog_entry.map(|entry| entry.values.clone()))
            .filter(|values| !values.is_empty())
            .ok_or_else(|| {
                ConfigError::configuration(
                    &self.path.join("values"),
                    "a collection needs a non-empty \"values\" array",
                )
            })?;
        let distribution = self
            .override_distribution(warnings)?
            .or(catalog_entry.and_then(|entry| entry.distribution))
            .unwrap_or_default();
        let samples = self.samples(catalog_entry.and_then(|entry| entry.samples))?;
        Ok((
            FieldSpec::Collection {
                values,
                distribution,
            },
            samples,
        ))
    }

    fn generable(
        &self,
        catalog_entry: Option<&GenerableType>,
        warnings: &mut Vec<ValidationIssue>,
    ) -> Result<(FieldSpec, usize)> {
        self.check_override_pattern()?;
        let field_override = self.field_override();
        let generator = match field_override.and_then(|field| field.generator.as_deref()) {
            Some(generator) => check_generator(Some(generator), &self.path)?,
            None => catalog_entry
                .map(|entry| entry.generator.clone())
                .ok_or_else(|| {
                    ConfigError::configuration(
                        &self.path,
                        "missing \"generator\", it must be a regular expression for generating",
                    )
                })?,
        };
        if field_override.is_some_and(|field| field.distribution.is_some()) {
            warn_generable_distribution(&self.path, warnings);
        }
        let samples = self.samples(catalog_entry.and_then(|entry| entry.samples))?;
        Ok((FieldSpec::Generable { generator }, samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_config;
    use crate::model::{DistributionShape, ValueRange};
    use fakedb_core::{EnumType, Table};
    use serde_json::json;

    fn schema() -> Schema {
        Schema {
            tables: vec![Table {
                name: "people".to_string(),
                columns: vec![
                    Column::new("id", "int"),
                    Column::new("age", "int"),
                    Column::new("first_name", "varchar"),
                    Column::new("mood", "mood"),
                    Column::new("score", "float"),
                ],
                references: Vec::new(),
            }],
            enums: vec![EnumType {
                name: "mood".to_string(),
                members: vec!["happy".to_string(), "sad".to_string()],
            }],
        }
    }

    fn resolved(user: Value) -> Result<ResolvedConfig> {
        resolve(&schema(), &user, &default_config())
    }

    #[test]
    fn infers_kinds_from_names_and_types() {
        let config = resolved(json!({})).unwrap();
        let people = config.table("people").unwrap();

        assert!(matches!(
            people.field("id").unwrap().spec,
            FieldSpec::Generable { .. }
        ));
        assert!(matches!(
            people.field("age").unwrap().spec,
            FieldSpec::Base { kind: BaseKind::Integer, .. }
        ));
        assert!(matches!(
            people.field("first_name").unwrap().spec,
            FieldSpec::Collection { .. }
        ));
        assert_eq!(
            people.field("mood").unwrap().spec,
            FieldSpec::Collection {
                values: vec![json!("happy"), json!("sad")],
                distribution: DistributionSpec::default(),
            }
        );
        assert_eq!(people.sample_count().unwrap(), DEFAULT_SAMPLES);
    }

    #[test]
    fn column_override_beats_catalog_defaults() {
        let config = resolved(json!({
            "schema": {"people": {
                "samples": 4,
                "age": {"type": "int", "value": {"start": 18, "end": 99},
                        "distribution": {"type": "log", "config": {"sigma": 0.25}}}
            }}
        }))
        .unwrap();
        let age = config.table("people").unwrap().field("age").unwrap();
        assert_eq!(age.samples, 4);
        let FieldSpec::Base { range, distribution, .. } = &age.spec else {
            panic!("age should be a base field");
        };
        assert_eq!(*range, ValueRange::Numeric { start: 18.0, end: 99.0 });
        assert_eq!(distribution.shape, DistributionShape::Log);
        assert_eq!(distribution.sigma, 0.25);
    }

    #[test]
    fn explicit_generable_override() {
        let config = resolved(json!({
            "schema": {"people": {"first_name": {"type": "generable", "generator": "[A-Z][a-z]{4}"}}}
        }))
        .unwrap();
        assert_eq!(
            config.table("people").unwrap().field("first_name").unwrap().spec,
            FieldSpec::Generable { generator: "[A-Z][a-z]{4}".to_string() }
        );
    }

    #[test]
    fn override_type_can_name_a_catalog_entry() {
        let config = resolved(json!({"schema": {"people": {"age": {"type": "sex"}}}})).unwrap();
        let FieldSpec::Collection { values, .. } =
            &config.table("people").unwrap().field("age").unwrap().spec
        else {
            panic!("age should resolve to the sex collection");
        };
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn unrecognized_override_type() {
        let err = resolved(json!({"schema": {"people": {"age": {"type": "geometry"}}}})).unwrap_err();
        assert!(matches!(err, ConfigError::UnrecognizedType { ref type_name, .. } if type_name == "geometry"));
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("schema.people.age.type")
        );
    }

    #[test]
    fn unknown_distribution_in_base_catalog_fails() {
        let err = resolved(json!({
            "data_types": {"base_types": {"float": {"distribution": {"type": "cauchy"}}}}
        }))
        .unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("data_types.base_types.float.distribution.type")
        );
    }

    #[test]
    fn generator_on_base_column_is_rejected() {
        let err = resolved(json!({
            "schema": {"people": {"age": {"type": "int", "generator": "[a-z]{3}"}}}
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Configuration { .. }));
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("schema.people.age.generator")
        );
    }

    #[test]
    fn value_on_generable_column_is_rejected() {
        let err = resolved(json!({
            "schema": {"people": {"id": {"value": {"start": 1, "end": 5}}}}
        }))
        .unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("schema.people.id.value")
        );
    }

    #[test]
    fn value_and_values_on_collection_and_base_are_rejected() {
        let err = resolved(json!({
            "schema": {"people": {"first_name": {"value": {"start": 0, "end": 1}}}}
        }))
        .unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("schema.people.first_name.value")
        );

        let err = resolved(json!({
            "schema": {"people": {"score": {"type": "float", "values": [1, 2]}}}
        }))
        .unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("schema.people.score.values")
        );
    }

    #[test]
    fn generable_override_distribution_warns() {
        let config = resolved(json!({
            "schema": {"people": {"id": {"distribution": {"type": "normal"}}}}
        }))
        .unwrap();
        assert_eq!(config.warnings.len(), 1);
        assert_eq!(config.warnings[0].path, "schema.people.id.distribution");
    }
}
