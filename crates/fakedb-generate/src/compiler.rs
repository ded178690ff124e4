//! Turns resolved configuration and schema references into ordered directives.

use std::collections::BTreeMap;

use tracing::{debug, info};

use fakedb_config::{ConfigError, ConfigPath, ResolvedConfig};
use fakedb_core::{DependencyGraph, Schema};

use crate::directive::{Dependency, Directive, DirectiveId, DirectiveSet};
use crate::errors::GenerationError;
use crate::generators::ValueGenerator;

/// Single-column foreign key after cardinality has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl ForeignKeyEdge {
    fn is_reverse_of(&self, other: &ForeignKeyEdge) -> bool {
        self.table == other.referenced_table
            && self.column == other.referenced_column
            && self.referenced_table == other.table
            && self.referenced_column == other.column
    }
}

/// Build one directive per table, wire foreign keys and assign sequence
/// indexes so every referenced table precedes the tables referencing it.
pub fn compile(
    schema: &Schema,
    config: &ResolvedConfig,
    run_seed: u64,
) -> Result<DirectiveSet, GenerationError> {
    let edges = extract_foreign_keys(schema)?;

    let mut referencing: BTreeMap<&str, Vec<&ForeignKeyEdge>> = BTreeMap::new();
    for edge in &edges {
        referencing.entry(edge.table.as_str()).or_default().push(edge);
    }

    let mut directives = Vec::with_capacity(schema.tables.len());
    for table in &schema.tables {
        let table_config = config.table(&table.name).ok_or_else(|| {
            ConfigError::configuration(
                &ConfigPath::new(["schema", table.name.as_str()]),
                "no resolved configuration for table",
            )
        })?;
        let foreign_columns: Vec<&str> = referencing
            .get(table.name.as_str())
            .map(|edges| edges.iter().map(|edge| edge.column.as_str()).collect())
            .unwrap_or_default();

        let sample_count = table_config.sample_count_excluding(&foreign_columns)?;

        let mut fields = Vec::new();
        for column in &table.columns {
            if foreign_columns.contains(&column.name.as_str()) {
                continue;
            }
            let field = table_config.field(&column.name).ok_or_else(|| {
                ConfigError::configuration(
                    &ConfigPath::new(["schema", table.name.as_str(), column.name.as_str()]),
                    "no resolved configuration for column",
                )
            })?;
            let generator = ValueGenerator::from_config(field)?;
            debug!(
                table = %table.name,
                column = %column.name,
                generator = generator.kind_name(),
                "field generator built"
            );
            fields.push((column.name.clone(), generator));
        }

        directives.push(Directive {
            sequence_index: 0,
            table: table.name.clone(),
            columns: table.column_names(),
            sample_count,
            fields,
            dependencies: Vec::new(),
            seed: hash_seed(run_seed, &table.name),
            cache: None,
        });
    }

    // All directives exist; wire each referencing column to its parent.
    let directive_id = |name: &str| {
        directives
            .iter()
            .position(|directive| directive.table == name)
            .map(DirectiveId)
    };
    let mut wiring = Vec::with_capacity(edges.len());
    for edge in &edges {
        let (Some(child), Some(parent)) = (
            directive_id(&edge.table),
            directive_id(&edge.referenced_table),
        ) else {
            return Err(GenerationError::UnresolvableDependency(format!(
                "{}.{} references {}.{} which has no directive",
                edge.table, edge.column, edge.referenced_table, edge.referenced_column
            )));
        };
        wiring.push((
            child,
            Dependency {
                field: edge.column.clone(),
                referenced_directive: parent,
                referenced_table: edge.referenced_table.clone(),
                referenced_field: edge.referenced_column.clone(),
            },
        ));
    }
    for (child, dependency) in wiring {
        directives[child.index()].dependencies.push(dependency);
    }

    let order = sequence(schema, &edges)?;
    let mut ids = Vec::with_capacity(order.len());
    for (sequence_index, table) in order.iter().enumerate() {
        let id = directive_id_in(&directives, table)?;
        directives[id.index()].sequence_index = sequence_index;
        ids.push(id);
    }

    info!(
        directives = directives.len(),
        dependencies = edges.len(),
        order = ?order,
        "directives compiled"
    );
    Ok(DirectiveSet::new(directives, ids))
}

/// Collect single-column foreign keys in schema order.
///
/// The first edge recorded for a referencing column wins; an edge whose
/// reverse is already recorded is dropped.
pub fn extract_foreign_keys(schema: &Schema) -> Result<Vec<ForeignKeyEdge>, GenerationError> {
    let mut edges: Vec<ForeignKeyEdge> = Vec::new();

    for reference in schema.references() {
        let sides = reference.sides();
        let ([column], [referenced_column]) =
            (sides.referencing_columns, sides.referenced_columns)
        else {
            return Err(GenerationError::UnsupportedSchema(format!(
                "foreign key {}({}) {} {}({}) must reference exactly one column on each side",
                reference.table1,
                reference.columns1.join(","),
                reference.cardinality.marker(),
                reference.table2,
                reference.columns2.join(","),
            )));
        };
        let edge = ForeignKeyEdge {
            table: sides.referencing_table.to_string(),
            column: column.clone(),
            referenced_table: sides.referenced_table.to_string(),
            referenced_column: referenced_column.clone(),
        };

        check_endpoint(schema, &edge.table, &edge.column)?;
        check_endpoint(schema, &edge.referenced_table, &edge.referenced_column)?;
        if edge.table == edge.referenced_table {
            return Err(GenerationError::UnresolvableDependency(format!(
                "{}.{} references its own table",
                edge.table, edge.column
            )));
        }

        if edges
            .iter()
            .any(|seen| seen.table == edge.table && seen.column == edge.column)
        {
            debug!(table = %edge.table, column = %edge.column, "duplicate foreign key dropped");
            continue;
        }
        if edges.iter().any(|seen| seen.is_reverse_of(&edge)) {
            debug!(
                table = %edge.table,
                column = %edge.column,
                "symmetric foreign key dropped"
            );
            continue;
        }
        edges.push(edge);
    }

    Ok(edges)
}

fn check_endpoint(schema: &Schema, table: &str, column: &str) -> Result<(), GenerationError> {
    let known = schema
        .table(table)
        .is_some_and(|table| table.has_column(column));
    if known {
        Ok(())
    } else {
        Err(GenerationError::UnresolvableDependency(format!(
            "reference to unknown column {table}.{column}"
        )))
    }
}

/// Stable topological order: of the tables whose parents are all placed, the
/// earliest in schema order goes next.
fn sequence(schema: &Schema, edges: &[ForeignKeyEdge]) -> Result<Vec<String>, GenerationError> {
    let mut graph = DependencyGraph::new(schema.tables.iter().map(|table| table.name.as_str()));
    for edge in edges {
        graph.add_edge(&edge.referenced_table, &edge.table)?;
    }
    let summary = graph.summary();
    debug!(tables = summary.nodes, edges = summary.edges, "dependency graph built");
    graph.toposort().map_err(|cycle| {
        GenerationError::UnresolvableDependency(format!(
            "foreign keys form a cycle between {}",
            cycle.join(", ")
        ))
    })
}

fn directive_id_in(directives: &[Directive], table: &str) -> Result<DirectiveId, GenerationError> {
    directives
        .iter()
        .position(|directive| directive.table == table)
        .map(DirectiveId)
        .ok_or_else(|| {
            GenerationError::UnresolvableDependency(format!("no directive for table {table}"))
        })
}

/// Mix a run seed with a key (FNV-1a) so each table draws an independent,
/// reproducible stream.
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakedb_config::{default_config, resolve};
    use fakedb_core::{Cardinality, Column, Reference, Table};
    use serde_json::json;

    fn table(name: &str, columns: &[&str], references: Vec<Reference>) -> Table {
        Table {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|column| Column::new(*column, "int"))
                .collect(),
            references,
        }
    }

    fn schema(tables: Vec<Table>) -> Schema {
        Schema {
            tables,
            enums: Vec::new(),
        }
    }

    fn compiled(schema: &Schema) -> Result<DirectiveSet, GenerationError> {
        let config = resolve(schema, &json!({}), &default_config())?;
        compile(schema, &config, 42)
    }

    fn sequence_of(set: &DirectiveSet, table: &str) -> usize {
        set.get(set.find(table).unwrap()).unwrap().sequence_index()
    }

    #[test]
    fn parents_precede_children_in_transitive_chains() {
        // Schema order lists the grandchild first and the grandparent last.
        let schema = schema(vec![
            table(
                "line",
                &["id", "order_ref"],
                vec![Reference::new("line", "order_ref", Cardinality::ManyToOne, "purchase", "id")],
            ),
            table(
                "purchase",
                &["id", "buyer_ref"],
                vec![Reference::new("purchase", "buyer_ref", Cardinality::ManyToOne, "buyer", "id")],
            ),
            table("buyer", &["id"], Vec::new()),
        ]);
        let set = compiled(&schema).unwrap();
        assert_eq!(sequence_of(&set, "buyer"), 0);
        assert_eq!(sequence_of(&set, "purchase"), 1);
        assert_eq!(sequence_of(&set, "line"), 2);

        let ordered: Vec<_> = set.ordered().map(|directive| directive.table()).collect();
        assert_eq!(ordered, ["buyer", "purchase", "line"]);
    }

    #[test]
    fn independent_tables_keep_schema_order() {
        let schema = schema(vec![
            table("b", &["id"], Vec::new()),
            table("a", &["id"], Vec::new()),
            table("c", &["id"], Vec::new()),
        ]);
        let set = compiled(&schema).unwrap();
        let ordered: Vec<_> = set.ordered().map(|directive| directive.table()).collect();
        assert_eq!(ordered, ["b", "a", "c"]);
    }

    #[test]
    fn referencing_columns_are_not_sampled() {
        let schema = schema(vec![
            table("users", &["id", "age"], Vec::new()),
            table(
                "orders",
                &["id", "user_ref"],
                vec![Reference::new("users", "id", Cardinality::OneToMany, "orders", "user_ref")],
            ),
        ]);
        let set = compiled(&schema).unwrap();
        let orders = set.get(set.find("orders").unwrap()).unwrap();
        let fields: Vec<_> = orders.fields().map(|(name, _)| name).collect();
        assert_eq!(fields, ["id"]);
        assert_eq!(orders.dependencies().len(), 1);
        assert_eq!(orders.dependencies()[0].field, "user_ref");
        assert_eq!(orders.dependencies()[0].referenced_table, "users");
        assert_eq!(orders.columns(), ["id", "user_ref"]);
    }

    #[test]
    fn multi_column_reference_is_unsupported() {
        let mut reference = Reference::new("orders", "a", Cardinality::ManyToOne, "users", "id");
        reference.columns1.push("b".to_string());
        reference.columns2.push("id".to_string());
        let schema = schema(vec![
            table("users", &["id"], Vec::new()),
            table("orders", &["a", "b"], vec![reference]),
        ]);
        assert!(matches!(
            compiled(&schema),
            Err(GenerationError::UnsupportedSchema(_))
        ));
    }

    #[test]
    fn cycles_are_unresolvable() {
        let schema = schema(vec![
            table(
                "a",
                &["id", "b_ref"],
                vec![Reference::new("a", "b_ref", Cardinality::ManyToOne, "b", "id")],
            ),
            table(
                "b",
                &["id", "a_ref"],
                vec![Reference::new("b", "a_ref", Cardinality::ManyToOne, "a", "id")],
            ),
        ]);
        assert!(matches!(
            compiled(&schema),
            Err(GenerationError::UnresolvableDependency(_))
        ));
    }

    #[test]
    fn self_and_dangling_references_are_unresolvable() {
        let self_ref = schema(vec![table(
            "node",
            &["id", "parent_ref"],
            vec![Reference::new("node", "parent_ref", Cardinality::ManyToOne, "node", "id")],
        )]);
        assert!(matches!(
            compiled(&self_ref),
            Err(GenerationError::UnresolvableDependency(_))
        ));

        let dangling = schema(vec![table(
            "orders",
            &["id", "user_ref"],
            vec![Reference::new("orders", "user_ref", Cardinality::ManyToOne, "users", "id")],
        )]);
        assert!(matches!(
            compiled(&dangling),
            Err(GenerationError::UnresolvableDependency(_))
        ));
    }

    #[test]
    fn symmetric_duplicates_keep_the_first_edge() {
        let forward = Reference::new("profile", "user_ref", Cardinality::OneToOne, "account", "id");
        let backward = Reference::new("account", "id", Cardinality::OneToOne, "profile", "user_ref");
        let repeated = Reference::new("profile", "user_ref", Cardinality::ManyToOne, "account", "id");
        let schema = schema(vec![
            table("account", &["id"], vec![backward]),
            table("profile", &["id", "user_ref"], vec![forward, repeated]),
        ]);

        let edges = extract_foreign_keys(&schema).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].table, "account");
        assert_eq!(edges[0].referenced_table, "profile");

        // Stable across repeated extraction.
        assert_eq!(extract_foreign_keys(&schema).unwrap(), edges);
    }

    #[test]
    fn compile_is_deterministic() {
        let schema = schema(vec![
            table("users", &["id"], Vec::new()),
            table(
                "orders",
                &["id", "user_ref"],
                vec![Reference::new("orders", "user_ref", Cardinality::ManyToOne, "users", "id")],
            ),
        ]);
        let first = compiled(&schema).unwrap();
        let second = compiled(&schema).unwrap();
        let summary = |set: &DirectiveSet| {
            set.ordered()
                .map(|directive| {
                    (
                        directive.table().to_string(),
                        directive.sequence_index(),
                        directive.seed(),
                        directive.sample_count(),
                    )
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&first), summary(&second));
    }

    #[test]
    fn hash_seed_depends_on_key() {
        assert_ne!(hash_seed(1, "users"), hash_seed(1, "orders"));
        assert_eq!(hash_seed(1, "users"), hash_seed(1, "users"));
    }

    #[test]
    fn hash_seed_is_pinned() {
        assert_eq!(hash_seed(42, "customers"), 16732080738796968328);
        assert_eq!(hash_seed(0, "users"), 4767205828091196211);
        assert_eq!(hash_seed(1, "orders"), 3821536862207072765);
    }
}
