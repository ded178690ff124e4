use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cardinality marker of a reference between two tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum Cardinality {
    /// `table1 > table2`: many rows of `table1` point at one row of `table2`.
    #[serde(rename = ">")]
    ManyToOne,
    /// `table1 < table2`: one row of `table1` is pointed at by many rows of `table2`.
    #[serde(rename = "<")]
    OneToMany,
    /// `table1 - table2`.
    #[serde(rename = "-")]
    OneToOne,
}

impl Cardinality {
    pub fn marker(self) -> &'static str {
        match self {
            Cardinality::ManyToOne => ">",
            Cardinality::OneToMany => "<",
            Cardinality::OneToOne => "-",
        }
    }
}

/// Foreign-key reference between `(table1, columns1)` and `(table2, columns2)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Reference {
    pub table1: String,
    pub columns1: Vec<String>,
    pub table2: String,
    pub columns2: Vec<String>,
    pub cardinality: Cardinality,
}

/// Orientation of a reference once the cardinality marker is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSides<'a> {
    pub referencing_table: &'a str,
    pub referencing_columns: &'a [String],
    pub referenced_table: &'a str,
    pub referenced_columns: &'a [String],
}

impl Reference {
    pub fn new(
        table1: impl Into<String>,
        column1: impl Into<String>,
        cardinality: Cardinality,
        table2: impl Into<String>,
        column2: impl Into<String>,
    ) -> Self {
        Self {
            table1: table1.into(),
            columns1: vec![column1.into()],
            table2: table2.into(),
            columns2: vec![column2.into()],
            cardinality,
        }
    }

    /// Split the reference into referencing and referenced sides.
    ///
    /// `>` and one-to-one keep `table1` as the referencing side; `<` swaps them.
    pub fn sides(&self) -> ReferenceSides<'_> {
        match self.cardinality {
            Cardinality::ManyToOne | Cardinality::OneToOne => ReferenceSides {
                referencing_table: &self.table1,
                referencing_columns: &self.columns1,
                referenced_table: &self.table2,
                referenced_columns: &self.columns2,
            },
            Cardinality::OneToMany => ReferenceSides {
                referencing_table: &self.table2,
                referencing_columns: &self.columns2,
                referenced_table: &self.table1,
                referenced_columns: &self.columns1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_to_many_swaps_sides() {
        let reference = Reference::new("users", "id", Cardinality::OneToMany, "orders", "user_id");
        let sides = reference.sides();
        assert_eq!(sides.referencing_table, "orders");
        assert_eq!(sides.referencing_columns, ["user_id".to_string()]);
        assert_eq!(sides.referenced_table, "users");
    }

    #[test]
    fn one_to_one_keeps_first_side_referencing() {
        let reference = Reference::new("profiles", "user_id", Cardinality::OneToOne, "users", "id");
        assert_eq!(reference.sides().referencing_table, "profiles");
    }
}
