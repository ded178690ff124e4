use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Validate internal consistency of a parsed schema.
///
/// This checks:
/// - duplicate tables/columns/enums
/// - enums declare at least one member
/// - references name at least one column on each side
///
/// Whether referenced tables and columns exist is checked when directives
/// are compiled, where a dangling reference is a dependency error.
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let mut tables = BTreeSet::new();
    for table in &schema.tables {
        if !tables.insert(table.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }
        }

        for reference in &table.references {
            if reference.columns1.is_empty() || reference.columns2.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "reference {} {} {} declared without columns",
                    reference.table1,
                    reference.cardinality.marker(),
                    reference.table2
                )));
            }
        }
    }

    let mut enums = BTreeSet::new();
    for enum_type in &schema.enums {
        if !enums.insert(enum_type.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate enum name: {}",
                enum_type.name
            )));
        }
        if enum_type.members.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "enum {} has no members",
                enum_type.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Table};
    use crate::types::EnumType;

    fn table(name: &str, columns: &[&str]) -> Table {
        Table {
            name: name.to_string(),
            columns: columns.iter().map(|c| Column::new(*c, "int")).collect(),
            references: Vec::new(),
        }
    }

    #[test]
    fn rejects_duplicate_columns() {
        let schema = Schema {
            tables: vec![table("users", &["id", "id"])],
            enums: Vec::new(),
        };
        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("users.id"));
    }

    #[test]
    fn rejects_empty_enum() {
        let schema = Schema {
            tables: vec![table("users", &["id"])],
            enums: vec![EnumType {
                name: "status".to_string(),
                members: Vec::new(),
            }],
        };
        assert!(matches!(
            validate_schema(&schema),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn accepts_consistent_schema() {
        let schema = Schema {
            tables: vec![table("users", &["id"]), table("orders", &["id", "user_id"])],
            enums: Vec::new(),
        };
        assert!(validate_schema(&schema).is_ok());
    }
}
