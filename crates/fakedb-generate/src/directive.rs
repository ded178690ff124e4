//! Compiled per-table generation units and their execution.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, ValueGenerator};

/// Handle of a directive inside a `DirectiveSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirectiveId(pub(crate) usize);

impl DirectiveId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A foreign-key column whose values come from another directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Referencing column of the owning table.
    pub field: String,
    pub referenced_directive: DirectiveId,
    pub referenced_table: String,
    pub referenced_field: String,
}

/// Generated rows of one table, stored column by column in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub table: String,
    pub columns: Vec<String>,
    values: Vec<Vec<GeneratedValue>>,
    row_count: usize,
}

impl TableData {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column(&self, name: &str) -> Option<&[GeneratedValue]> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|index| self.values[index].as_slice())
    }

    pub fn row(&self, index: usize) -> Option<Vec<&GeneratedValue>> {
        (index < self.row_count).then(|| self.values.iter().map(|column| &column[index]).collect())
    }

    /// Rows in generation order, values in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&GeneratedValue>> + '_ {
        (0..self.row_count).map(|index| self.values.iter().map(|column| &column[index]).collect())
    }
}

/// Generation unit for one table.
#[derive(Debug, Clone)]
pub struct Directive {
    pub(crate) sequence_index: usize,
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) sample_count: usize,
    pub(crate) fields: Vec<(String, ValueGenerator)>,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) seed: u64,
    pub(crate) cache: Option<TableData>,
}

impl Directive {
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValueGenerator)> {
        self.fields
            .iter()
            .map(|(name, generator)| (name.as_str(), generator))
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_generated(&self) -> bool {
        self.cache.is_some()
    }

    pub fn generated(&self) -> Option<&TableData> {
        self.cache.as_ref()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
            || self.dependencies.iter().any(|dependency| dependency.field == name)
    }

    /// Sample own fields and expand the cross product of `parent_values`,
    /// one list per dependency in dependency order.
    fn generate(&self, parent_values: &[Vec<GeneratedValue>]) -> Result<TableData, GenerationError> {
        let row_count = parent_values
            .iter()
            .try_fold(self.sample_count, |rows, values| rows.checked_mul(values.len()))
            .ok_or_else(|| GenerationError::RowCountOverflow {
                table: self.table.clone(),
            })?;
        let entries = row_count / self.sample_count.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut generated = Vec::with_capacity(self.fields.len());
        for (name, generator) in &self.fields {
            generated.push((name.as_str(), generator.generate(row_count, &mut rng)?));
        }

        // Entry `i` of the cross product picks one parent value per dependency;
        // the last dependency varies fastest. Each entry spans `sample_count`
        // contiguous rows.
        let mut stride = entries;
        let mut expanded = Vec::with_capacity(self.dependencies.len());
        for (dependency, values) in self.dependencies.iter().zip(parent_values) {
            stride /= values.len().max(1);
            let column: Vec<GeneratedValue> = (0..row_count)
                .map(|row| {
                    let entry = row / self.sample_count.max(1);
                    values[(entry / stride.max(1)) % values.len()].clone()
                })
                .collect();
            expanded.push((dependency.field.as_str(), column));
        }

        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let data = generated
                .iter_mut()
                .chain(expanded.iter_mut())
                .find(|(name, _)| *name == column.as_str())
                .map(|(_, data)| std::mem::take(data))
                .ok_or_else(|| GenerationError::UnknownField {
                    table: self.table.clone(),
                    field: column.clone(),
                })?;
            values.push(data);
        }

        Ok(TableData {
            table: self.table.clone(),
            columns: self.columns.clone(),
            values,
            row_count,
        })
    }
}

/// Arena of directives addressed by `DirectiveId`.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    directives: Vec<Directive>,
    order: Vec<DirectiveId>,
}

impl DirectiveSet {
    pub(crate) fn new(directives: Vec<Directive>, order: Vec<DirectiveId>) -> Self {
        Self { directives, order }
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn get(&self, id: DirectiveId) -> Option<&Directive> {
        self.directives.get(id.0)
    }

    pub fn find(&self, table: &str) -> Option<DirectiveId> {
        self.directives
            .iter()
            .position(|directive| directive.table == table)
            .map(DirectiveId)
    }

    /// Directives by ascending sequence index.
    pub fn ordered(&self) -> impl Iterator<Item = &Directive> {
        self.order.iter().map(|id| &self.directives[id.0])
    }

    pub fn order(&self) -> &[DirectiveId] {
        &self.order
    }

    fn directive(&self, id: DirectiveId) -> Result<&Directive, GenerationError> {
        self.directives.get(id.0).ok_or_else(|| {
            GenerationError::UnresolvableDependency(format!("no directive with index {}", id.0))
        })
    }

    /// Generate the directive once and return its rows.
    ///
    /// Referenced directives are fetched first; cached rows are returned as-is.
    pub fn fetch(&mut self, id: DirectiveId) -> Result<&TableData, GenerationError> {
        if !self.directive(id)?.is_generated() {
            let dependencies = self.directive(id)?.dependencies.clone();
            let mut parent_values = Vec::with_capacity(dependencies.len());
            for dependency in &dependencies {
                let values =
                    self.fetch_field(dependency.referenced_directive, &dependency.referenced_field)?;
                parent_values.push(values.to_vec());
            }

            let directive = self.directive(id)?;
            let data = directive.generate(&parent_values)?;
            debug!(
                table = %directive.table,
                rows = data.row_count(),
                dependencies = dependencies.len(),
                "directive generated"
            );
            self.directives[id.0].cache = Some(data);
        }

        let directive = self.directive(id)?;
        directive.cache.as_ref().ok_or_else(|| {
            GenerationError::UnresolvableDependency(format!(
                "directive for '{}' produced no data",
                directive.table
            ))
        })
    }

    /// Values of one column, generating the directive if needed.
    pub fn fetch_field(
        &mut self,
        id: DirectiveId,
        field: &str,
    ) -> Result<&[GeneratedValue], GenerationError> {
        let directive = self.directive(id)?;
        if !directive.has_field(field) {
            return Err(GenerationError::UnknownField {
                table: directive.table.clone(),
                field: field.to_string(),
            });
        }
        let table = directive.table.clone();
        let data = self.fetch(id)?;
        data.column(field).ok_or_else(|| GenerationError::UnknownField {
            table,
            field: field.to_string(),
        })
    }

    /// Drop cached rows so the next fetch generates again.
    pub fn reset(&mut self, id: DirectiveId) -> Result<(), GenerationError> {
        self.directive(id)?;
        self.directives[id.0].cache = None;
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for directive in &mut self.directives {
            directive.cache = None;
        }
    }

    /// Generate every directive in sequence order.
    pub fn execute(&mut self) -> Result<Vec<TableData>, GenerationError> {
        let order = self.order.clone();
        let mut tables = Vec::with_capacity(order.len());
        for id in order {
            tables.push(self.fetch(id)?.clone());
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::GenerableGenerator;

    fn directive(table: &str, columns: &[&str], sample_count: usize, seed: u64) -> Directive {
        Directive {
            sequence_index: 0,
            table: table.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            sample_count,
            fields: Vec::new(),
            dependencies: Vec::new(),
            seed,
            cache: None,
        }
    }

    fn text_field(name: &str, expression: &str) -> (String, ValueGenerator) {
        (
            name.to_string(),
            ValueGenerator::Generable(GenerableGenerator::new(expression).unwrap()),
        )
    }

    fn dependency(field: &str, id: usize, table: &str) -> Dependency {
        Dependency {
            field: field.to_string(),
            referenced_directive: DirectiveId(id),
            referenced_table: table.to_string(),
            referenced_field: "id".to_string(),
        }
    }

    /// users(id) x3, tags(id) x2, posts(id, user_id, tag_id) x2.
    fn set() -> DirectiveSet {
        let mut users = directive("users", &["id"], 3, 1);
        users.fields.push(text_field("id", "u[0-9]{6}"));
        let mut tags = directive("tags", &["id"], 2, 2);
        tags.fields.push(text_field("id", "t[0-9]{6}"));
        let mut posts = directive("posts", &["id", "user_id", "tag_id"], 2, 3);
        posts.fields.push(text_field("id", "p[0-9]{6}"));
        posts.dependencies.push(dependency("user_id", 0, "users"));
        posts.dependencies.push(dependency("tag_id", 1, "tags"));
        DirectiveSet::new(
            vec![users, tags, posts],
            vec![DirectiveId(0), DirectiveId(1), DirectiveId(2)],
        )
    }

    #[test]
    fn independent_directive_yields_sample_count_rows() {
        let mut set = set();
        let users = set.fetch(DirectiveId(0)).unwrap();
        assert_eq!(users.row_count(), 3);
        assert_eq!(users.column("id").unwrap().len(), 3);
    }

    #[test]
    fn dependencies_expand_into_a_cross_product() {
        let mut set = set();
        let user_ids = set.fetch_field(DirectiveId(0), "id").unwrap().to_vec();
        let tag_ids = set.fetch_field(DirectiveId(1), "id").unwrap().to_vec();
        let posts = set.fetch(DirectiveId(2)).unwrap();

        assert_eq!(posts.row_count(), 2 * 3 * 2);
        let user_column = posts.column("user_id").unwrap();
        let tag_column = posts.column("tag_id").unwrap();

        let mut index = 0;
        for user in &user_ids {
            for tag in &tag_ids {
                for _ in 0..2 {
                    assert_eq!(&user_column[index], user);
                    assert_eq!(&tag_column[index], tag);
                    index += 1;
                }
            }
        }
    }

    #[test]
    fn fetch_is_idempotent_and_reset_regenerates() {
        let mut set = set();
        let first = set.fetch(DirectiveId(2)).unwrap().clone();
        let second = set.fetch(DirectiveId(2)).unwrap().clone();
        assert_eq!(first, second);

        set.reset(DirectiveId(2)).unwrap();
        assert!(!set.get(DirectiveId(2)).unwrap().is_generated());
        let regenerated = set.fetch(DirectiveId(2)).unwrap().clone();
        assert_eq!(first, regenerated);
    }

    #[test]
    fn fetching_a_child_generates_its_parents_once() {
        let mut set = set();
        set.fetch(DirectiveId(2)).unwrap();
        assert!(set.get(DirectiveId(0)).unwrap().is_generated());
        let parent_ids = set.fetch_field(DirectiveId(0), "id").unwrap().to_vec();
        let posts = set.fetch(DirectiveId(2)).unwrap();
        assert!(
            posts
                .column("user_id")
                .unwrap()
                .iter()
                .all(|value| parent_ids.contains(value))
        );
    }

    #[test]
    fn oversized_cross_product_is_an_error() {
        let mut users = directive("users", &["id"], 3, 1);
        users.fields.push(text_field("id", "u[0-9]{6}"));
        let mut posts = directive("posts", &["id", "user_id"], usize::MAX / 2, 3);
        posts.fields.push(text_field("id", "p[0-9]{6}"));
        posts.dependencies.push(dependency("user_id", 0, "users"));
        let mut set = DirectiveSet::new(vec![users, posts], vec![DirectiveId(0), DirectiveId(1)]);

        let err = set.fetch(DirectiveId(1)).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::RowCountOverflow { ref table } if table == "posts"
        ));
        assert!(!set.get(DirectiveId(1)).unwrap().is_generated());
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut set = set();
        let err = set.fetch_field(DirectiveId(0), "email").unwrap_err();
        assert!(matches!(
            err,
            GenerationError::UnknownField { ref table, ref field } if table == "users" && field == "email"
        ));
    }

    #[test]
    fn rows_follow_column_order() {
        let mut set = set();
        let posts = set.fetch(DirectiveId(2)).unwrap();
        let first = posts.row(0).unwrap();
        assert_eq!(first.len(), 3);
        assert!(first[0].as_str().unwrap().starts_with('p'));
        assert!(first[1].as_str().unwrap().starts_with('u'));
        assert!(first[2].as_str().unwrap().starts_with('t'));
        assert_eq!(posts.rows().count(), 12);
        assert!(posts.row(12).is_none());
    }
}
