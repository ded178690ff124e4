//! Typed type catalogs parsed out of the merged configuration document.

use std::collections::BTreeMap;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use fakedb_core::EnumType;

use crate::bounds::parse_range;
use crate::errors::{ConfigError, ConfigPath, Result, ValidationIssue};
use crate::model::{
    BaseKind, BaseTypeEntry, CollectionEntry, DistributionEntry, DistributionSpec, GenerableEntry,
    ValueRange,
};

/// Repetition cap used when rendering unbounded generator quantifiers.
pub const GENERATOR_MAX_REPEAT: u32 = 32;

/// Priority given to collections synthesized from schema enums.
pub const ENUM_COLLECTION_PRIORITY: i64 = 1000;

#[derive(Debug, Clone)]
pub struct BaseType {
    pub name: String,
    pub kind: BaseKind,
    pub range: ValueRange,
    pub samples: Option<usize>,
    pub distribution: Option<DistributionSpec>,
}

#[derive(Debug, Clone)]
pub struct CollectionType {
    pub name: String,
    pub pattern: Regex,
    pub values: Vec<Value>,
    pub samples: Option<usize>,
    pub priority: i64,
    pub distribution: Option<DistributionSpec>,
}

#[derive(Debug, Clone)]
pub struct GenerableType {
    pub name: String,
    pub pattern: Regex,
    pub generator: String,
    pub samples: Option<usize>,
    pub priority: i64,
}

/// A collection or generable entry selected by name or pattern.
#[derive(Debug, Clone, Copy)]
pub enum CatalogMatch<'a> {
    Collection(&'a CollectionType),
    Generable(&'a GenerableType),
}

impl CatalogMatch<'_> {
    pub fn name(&self) -> &str {
        match self {
            CatalogMatch::Collection(entry) => &entry.name,
            CatalogMatch::Generable(entry) => &entry.name,
        }
    }

    fn priority(&self) -> i64 {
        match self {
            CatalogMatch::Collection(entry) => entry.priority,
            CatalogMatch::Generable(entry) => entry.priority,
        }
    }

    fn pattern(&self) -> &Regex {
        match self {
            CatalogMatch::Collection(entry) => &entry.pattern,
            CatalogMatch::Generable(entry) => &entry.pattern,
        }
    }

    /// A candidate matches when the pattern matches its prefix or it equals
    /// the entry name.
    fn accepts(&self, candidate: &str) -> bool {
        candidate == self.name() || self.pattern().is_match(candidate)
    }
}

/// Base, collection and generable catalogs after validation.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    base_types: BTreeMap<BaseKind, BaseType>,
    collections: Vec<CollectionType>,
    generables: Vec<GenerableType>,
}

impl TypeCatalog {
    /// Validate the `data_types` section of a merged configuration.
    pub fn from_config(config: &Value, warnings: &mut Vec<ValidationIssue>) -> Result<Self> {
        let root = ConfigPath::root();
        let data_types_path = root.join("data_types");
        let data_types = config
            .get("data_types")
            .and_then(Value::as_object)
            .ok_or_else(|| ConfigError::configuration(&root, "missing the field \"data_types\""))?;

        let mut catalog = TypeCatalog::default();

        let base_path = data_types_path.join("base_types");
        for (name, raw) in section(data_types, "base_types", &data_types_path)? {
            let path = base_path.join(name.as_str());
            let entry: BaseTypeEntry = parse_entry(raw, &path)?;
            let base = parse_base_type(name, entry, &path, warnings)?;
            if let Some(existing) = catalog.base_types.get(&base.kind) {
                return Err(ConfigError::configuration(
                    &path,
                    format!(
                        "base type '{name}' maps to the same kind as '{}'",
                        existing.name
                    ),
                ));
            }
            debug!(base_type = %name, kind = base.kind.as_str(), "base type validated");
            catalog.base_types.insert(base.kind, base);
        }

        let collections_path = data_types_path.join("collections");
        for (name, raw) in section(data_types, "collections", &data_types_path)? {
            let path = collections_path.join(name.as_str());
            let entry: CollectionEntry = parse_entry(raw, &path)?;
            let collection = parse_collection(name, entry, &path, warnings)?;
            debug!(collection = %name, values = collection.values.len(), "collection validated");
            catalog.collections.push(collection);
        }

        let generables_path = data_types_path.join("generables");
        for (name, raw) in section(data_types, "generables", &data_types_path)? {
            let path = generables_path.join(name.as_str());
            if catalog.collection(name).is_some() {
                return Err(ConfigError::configuration(
                    &path,
                    format!("'{name}' is already declared as a collection"),
                ));
            }
            let entry: GenerableEntry = parse_entry(raw, &path)?;
            let generable = parse_generable(name, entry, &path, warnings)?;
            debug!(generable = %name, "generable validated");
            catalog.generables.push(generable);
        }

        Ok(catalog)
    }

    pub fn base_type(&self, kind: BaseKind) -> Option<&BaseType> {
        self.base_types.get(&kind)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionType> {
        self.collections.iter().find(|entry| entry.name == name)
    }

    pub fn generable(&self, name: &str) -> Option<&GenerableType> {
        self.generables.iter().find(|entry| entry.name == name)
    }

    pub fn collections(&self) -> &[CollectionType] {
        &self.collections
    }

    pub fn generables(&self) -> &[GenerableType] {
        &self.generables
    }

    /// Best match across collections and generables.
    pub fn find_match(&self, column_name: &str, type_name: &str) -> Option<CatalogMatch<'_>> {
        let candidates = self
            .collections
            .iter()
            .map(CatalogMatch::Collection)
            .chain(self.generables.iter().map(CatalogMatch::Generable));
        best_match(candidates, column_name, type_name)
    }

    pub fn find_collection(&self, column_name: &str, type_name: &str) -> Option<&CollectionType> {
        let candidates = self.collections.iter().map(CatalogMatch::Collection);
        match best_match(candidates, column_name, type_name) {
            Some(CatalogMatch::Collection(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn find_generable(&self, column_name: &str, type_name: &str) -> Option<&GenerableType> {
        let candidates = self.generables.iter().map(CatalogMatch::Generable);
        match best_match(candidates, column_name, type_name) {
            Some(CatalogMatch::Generable(entry)) => Some(entry),
            _ => None,
        }
    }
}

/// Entries are tried in descending priority, ties in catalog order; each
/// entry is tested against the column name first, then the declared type.
fn best_match<'a>(
    candidates: impl Iterator<Item = CatalogMatch<'a>>,
    column_name: &str,
    type_name: &str,
) -> Option<CatalogMatch<'a>> {
    let mut ranked: Vec<CatalogMatch<'a>> = candidates.collect();
    ranked.sort_by_key(|entry| std::cmp::Reverse(entry.priority()));
    ranked
        .into_iter()
        .find(|entry| entry.accepts(column_name) || entry.accepts(type_name))
}

/// Add one collection per schema enum to `config.data_types.collections`.
///
/// A collection the user already declared under the enum name is kept.
pub fn inject_enum_collections(config: &mut Value, enums: &[EnumType]) {
    if enums.is_empty() {
        return;
    }
    let Some(collections) = config
        .get_mut("data_types")
        .and_then(|data_types| data_types.get_mut("collections"))
        .and_then(Value::as_object_mut)
    else {
        warn!("skipping enum collections: data_types.collections is missing");
        return;
    };

    for enum_type in enums {
        if collections.contains_key(&enum_type.name) {
            debug!(collection = %enum_type.name, "keeping user collection over enum");
            continue;
        }
        debug!(
            collection = %enum_type.name,
            values = enum_type.members.len(),
            "adding enum collection"
        );
        collections.insert(
            enum_type.name.clone(),
            json!({
                "pattern": format!("^{}$", regex::escape(&enum_type.name)),
                "values": enum_type.members,
                "priority": ENUM_COLLECTION_PRIORITY,
                "samples": 10,
                "distribution": {"type": "normal", "config": null}
            }),
        );
    }
}

/// Compile a name-matching pattern anchored at the start of the candidate.
pub fn compile_pattern(pattern: Option<&str>, path: &ConfigPath) -> Result<Regex> {
    let pattern = pattern
        .filter(|pattern| !pattern.is_empty())
        .ok_or_else(|| ConfigError::configuration(path, "missing the field \"pattern\""))?;
    Regex::new(&format!("^(?:{pattern})")).map_err(|err| {
        ConfigError::configuration(
            &path.join("pattern"),
            format!("the pattern \"{pattern}\" is an invalid regex: {err}"),
        )
    })
}

/// Check a generator expression can be rendered into strings.
pub fn check_generator(generator: Option<&str>, path: &ConfigPath) -> Result<String> {
    let generator = generator.filter(|generator| !generator.is_empty()).ok_or_else(|| {
        ConfigError::configuration(
            path,
            "missing \"generator\", it must be a regular expression for generating",
        )
    })?;
    rand_regex::Regex::compile(generator, GENERATOR_MAX_REPEAT).map_err(|err| {
        ConfigError::configuration(
            &path.join("generator"),
            format!("the generator \"{generator}\" cannot be rendered: {err}"),
        )
    })?;
    Ok(generator.to_string())
}

/// Deserialize a catalog entry or override, reporting failures at `path`.
pub fn parse_entry<T: DeserializeOwned>(raw: &Value, path: &ConfigPath) -> Result<T> {
    serde_json::from_value(raw.clone())
        .map_err(|err| ConfigError::configuration(path, err.to_string()))
}

/// Parse an optional raw distribution block.
pub fn parse_distribution(
    raw: Option<&DistributionEntry>,
    path: &ConfigPath,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<Option<DistributionSpec>> {
    raw.map(|entry| DistributionSpec::from_entry(entry, &path.join("distribution"), warnings))
        .transpose()
}

pub fn sample_count(samples: Option<u64>, path: &ConfigPath) -> Result<Option<usize>> {
    samples
        .map(|samples| {
            usize::try_from(samples).map_err(|_| {
                ConfigError::configuration(&path.join("samples"), "sample count is too large")
            })
        })
        .transpose()
}

fn section<'a>(
    data_types: &'a Map<String, Value>,
    key: &str,
    path: &ConfigPath,
) -> Result<&'a Map<String, Value>> {
    data_types
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ConfigError::configuration(path, format!("missing the field \"{key}\"")))
}

fn parse_base_type(
    name: &str,
    entry: BaseTypeEntry,
    path: &ConfigPath,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<BaseType> {
    let kind = BaseKind::from_type_name(name)
        .ok_or_else(|| ConfigError::configuration(path, format!("unknown data type {name}")))?;
    let bounds = entry
        .value
        .as_ref()
        .ok_or_else(|| ConfigError::configuration(path, "missing the field \"value\""))?;
    let range = parse_range(kind, bounds, &path.join("value"))?;
    Ok(BaseType {
        name: name.to_string(),
        kind,
        range,
        samples: sample_count(entry.samples, path)?,
        distribution: parse_distribution(entry.distribution.as_ref(), path, warnings)?,
    })
}

fn parse_collection(
    name: &str,
    entry: CollectionEntry,
    path: &ConfigPath,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<CollectionType> {
    let pattern = compile_pattern(entry.pattern.as_deref(), path)?;
    let values = entry.values.filter(|values| !values.is_empty()).ok_or_else(|| {
        ConfigError::configuration(path, "missing \"values\", it must be a non-empty array")
    })?;
    Ok(CollectionType {
        name: name.to_string(),
        pattern,
        values,
        samples: sample_count(entry.samples, path)?,
        priority: entry.priority.unwrap_or_default(),
        distribution: parse_distribution(entry.distribution.as_ref(), path, warnings)?,
    })
}

fn parse_generable(
    name: &str,
    entry: GenerableEntry,
    path: &ConfigPath,
    warnings: &mut Vec<ValidationIssue>,
) -> Result<GenerableType> {
    let pattern = compile_pattern(entry.pattern.as_deref(), path)?;
    let generator = check_generator(entry.generator.as_deref(), path)?;
    if entry.distribution.is_some() {
        warn_generable_distribution(path, warnings);
    }
    Ok(GenerableType {
        name: name.to_string(),
        pattern,
        generator,
        samples: sample_count(entry.samples, path)?,
        priority: entry.priority.unwrap_or_default(),
    })
}

pub(crate) fn warn_generable_distribution(path: &ConfigPath, warnings: &mut Vec<ValidationIssue>) {
    let path = path.join("distribution");
    warn!(path = %path, "distribution on a generable type is ignored");
    warnings.push(ValidationIssue::new(
        "generable_distribution_ignored",
        &path,
        "generable types render their generator expression; the distribution is ignored",
        Some("remove the distribution block".to_string()),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_config;

    fn catalog(config: &Value) -> TypeCatalog {
        TypeCatalog::from_config(config, &mut Vec::new()).expect("valid catalog")
    }

    #[test]
    fn default_catalog_is_valid() {
        let catalog = catalog(&default_config());
        assert!(catalog.base_type(BaseKind::Datetime).is_some());
        assert_eq!(catalog.collections().len(), 5);
        assert_eq!(catalog.generables().len(), 8);
    }

    #[test]
    fn matches_column_name_by_prefix_pattern() {
        let catalog = catalog(&default_config());
        let found = catalog.find_match("first_name", "varchar").unwrap();
        assert_eq!(found.name(), "name");

        let found = catalog.find_match("user_id", "int").unwrap();
        assert_eq!(found.name(), "id");
    }

    #[test]
    fn falls_back_to_declared_type() {
        let catalog = catalog(&default_config());
        let found = catalog.find_match("title", "varchar(120)").unwrap();
        assert_eq!(found.name(), "varchar");
    }

    #[test]
    fn higher_priority_wins() {
        let catalog = catalog(&default_config());
        assert_eq!(catalog.find_match("uuid", "varchar").unwrap().name(), "uuid");
        assert_eq!(catalog.find_match("surname", "varchar").unwrap().name(), "surname");
    }

    #[test]
    fn priority_ties_keep_catalog_order() {
        let config = json!({
            "data_types": {
                "base_types": {},
                "collections": {
                    "alpha": {"pattern": "code", "values": ["a"]},
                    "beta": {"pattern": "code", "values": ["b"]}
                },
                "generables": {
                    "gamma": {"pattern": "code", "generator": "[a-z]"}
                }
            }
        });
        let catalog = catalog(&config);
        assert_eq!(catalog.find_match("code", "text").unwrap().name(), "alpha");
        assert_eq!(catalog.find_generable("code", "text").unwrap().name, "gamma");
    }

    #[test]
    fn invalid_pattern_reports_path() {
        let mut config = default_config();
        config["data_types"]["collections"]["name"]["pattern"] = json!("(unclosed");
        let err = TypeCatalog::from_config(&config, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("data_types.collections.name.pattern")
        );
    }

    #[test]
    fn empty_collection_values_are_rejected() {
        let mut config = default_config();
        config["data_types"]["collections"]["sex"]["values"] = json!([]);
        let err = TypeCatalog::from_config(&config, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("data_types.collections.sex")
        );
    }

    #[test]
    fn generable_distribution_is_a_warning() {
        let mut config = default_config();
        config["data_types"]["generables"]["dni"]["distribution"] = json!({"type": "normal"});
        let mut warnings = Vec::new();
        TypeCatalog::from_config(&config, &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "data_types.generables.dni.distribution");
    }

    #[test]
    fn duplicate_base_kind_is_rejected() {
        let mut config = default_config();
        config["data_types"]["base_types"]["integer"] = config["data_types"]["base_types"]["int"].clone();
        let err = TypeCatalog::from_config(&config, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("same kind"));
    }

    #[test]
    fn name_shared_by_collection_and_generable_is_rejected() {
        let mut config = default_config();
        config["data_types"]["generables"]["sex"] = json!({"pattern": "sex", "generator": "[mf]"});
        let err = TypeCatalog::from_config(&config, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("data_types.generables.sex")
        );
    }

    #[test]
    fn enum_collections_are_injected_with_high_priority() {
        let mut config = default_config();
        let enums = vec![EnumType {
            name: "order_status".to_string(),
            members: vec!["new".to_string(), "shipped".to_string()],
        }];
        inject_enum_collections(&mut config, &enums);
        let catalog = catalog(&config);
        let collection = catalog.collection("order_status").unwrap();
        assert_eq!(collection.priority, ENUM_COLLECTION_PRIORITY);
        assert_eq!(collection.values, vec![json!("new"), json!("shipped")]);
        assert_eq!(
            catalog.find_match("status", "order_status").unwrap().name(),
            "order_status"
        );
    }

    #[test]
    fn user_collection_shadows_enum() {
        let mut config = default_config();
        config["data_types"]["collections"]["mood"] =
            json!({"pattern": "mood", "values": ["calm"]});
        let enums = vec![EnumType {
            name: "mood".to_string(),
            members: vec!["happy".to_string()],
        }];
        inject_enum_collections(&mut config, &enums);
        assert_eq!(
            catalog(&config).collection("mood").unwrap().values,
            vec![json!("calm")]
        );
    }
}
