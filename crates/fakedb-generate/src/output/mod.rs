//! Renderers turning generated tables into text.

pub mod csv;
pub mod sql;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::directive::TableData;
use crate::errors::GenerationError;

pub use self::csv::CsvFormatter;
pub use self::sql::SqlFormatter;

/// Renders one table at a time; tables arrive in sequence order.
pub trait Formatter {
    fn format_table(&self, table: &TableData) -> Result<String, GenerationError>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Sql,
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Sql => Box::new(SqlFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{other}', expected sql or csv")),
        }
    }
}

/// Rendered text of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub table: String,
    pub contents: String,
}

/// Output of a run in one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub format: OutputFormat,
    pub tables: Vec<RenderedTable>,
}

impl RenderedOutput {
    /// All tables as one document, separated by blank lines.
    pub fn joined(&self) -> String {
        self.tables
            .iter()
            .map(|table| table.contents.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn render(format: OutputFormat, tables: &[TableData]) -> Result<RenderedOutput, GenerationError> {
    let formatter = format.formatter();
    let mut rendered = Vec::with_capacity(tables.len());
    for table in tables {
        rendered.push(RenderedTable {
            table: table.table.clone(),
            contents: formatter.format_table(table)?,
        });
    }
    Ok(RenderedOutput {
        format,
        tables: rendered,
    })
}
