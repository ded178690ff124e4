use serde::{Deserialize, Serialize};

use fakedb_config::ValidationIssue;

use crate::output::OutputFormat;

/// Options for the generation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Run seed; drawn from the thread RNG and reported when absent.
    pub seed: Option<u64>,
    pub format: OutputFormat,
}

/// Summary of a generated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub sequence_index: usize,
    pub samples_requested: u64,
    pub rows_generated: u64,
    /// Referenced tables, one entry per foreign-key column.
    pub depends_on: Vec<String>,
}

/// Structured non-fatal issue found while resolving configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&ValidationIssue> for GenerationIssue {
    fn from(issue: &ValidationIssue) -> Self {
        Self {
            code: issue.code.clone(),
            path: issue.path.clone(),
            message: issue.message.clone(),
            hint: issue.hint.clone(),
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub format: OutputFormat,
    pub tables: Vec<TableReport>,
    pub rows_total: u64,
    pub duration_ms: u64,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, format: OutputFormat) -> Self {
        Self {
            run_id,
            seed,
            format,
            tables: Vec::new(),
            rows_total: 0,
            duration_ms: 0,
            warnings: Vec::new(),
        }
    }

    pub fn record_table(&mut self, table: TableReport) {
        self.rows_total += table.rows_generated;
        self.tables.push(table);
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        self.warnings.push(issue);
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }
}
