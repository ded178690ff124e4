use crate::directive::TableData;
use crate::errors::GenerationError;
use crate::output::Formatter;

/// One batch `INSERT` statement per table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFormatter;

impl Formatter for SqlFormatter {
    fn format_table(&self, table: &TableData) -> Result<String, GenerationError> {
        if table.is_empty() {
            return Ok(format!("-- {}: no rows generated", table.table));
        }

        let rows: Vec<String> = table
            .rows()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|value| value.to_sql()).collect();
                format!("({})", values.join(","))
            })
            .collect();

        Ok(format!(
            "INSERT INTO {}({}) VALUES\n\t{};",
            table.table,
            table.columns.join(","),
            rows.join("\n\t,")
        ))
    }
}
