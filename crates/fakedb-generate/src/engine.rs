use std::time::Instant;

use rand::Rng;
use serde_json::Value;
use tracing::{info, info_span, warn};

use fakedb_config::resolve;
use fakedb_core::{Schema, validate_schema};

use crate::compiler::compile;
use crate::directive::TableData;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, GenerationIssue, GenerationReport, TableReport};
use crate::output::{RenderedOutput, render};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated tables in sequence order.
    pub tables: Vec<TableData>,
    pub output: RenderedOutput,
    /// Seed the run sampled with, drawn when none was configured.
    pub seed: u64,
    pub report: GenerationReport,
}

impl GenerationResult {
    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.iter().find(|table| table.table == name)
    }
}

/// Entry point for generating fake rows from a schema and configuration.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Resolve, compile, execute in sequence order and render.
    ///
    /// Resolution and compilation finish before any row is generated.
    pub fn run(
        &self,
        schema: &Schema,
        user_config: &Value,
        default_config: &Value,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self
            .options
            .seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        let format = self.options.format;

        let span = info_span!("generation", run_id = %run_id);
        let _guard = span.enter();

        info!(
            seed,
            format = %format,
            tables = schema.tables.len(),
            "generation started"
        );

        let mut report = GenerationReport::new(run_id.clone(), seed, format);

        let result = (|| -> Result<(Vec<TableData>, RenderedOutput), GenerationError> {
            validate_schema(schema)?;

            let resolved = resolve(schema, user_config, default_config)?;
            for issue in &resolved.warnings {
                warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
                report.record_warning(GenerationIssue::from(issue));
            }

            let mut directives = compile(schema, &resolved, seed)?;
            let tables = directives.execute()?;

            for directive in directives.ordered() {
                let rows = directive
                    .generated()
                    .map(|data| data.row_count() as u64)
                    .unwrap_or_default();
                info!(
                    table = %directive.table(),
                    sequence_index = directive.sequence_index(),
                    rows,
                    "table generated"
                );
                report.record_table(TableReport {
                    table: directive.table().to_string(),
                    sequence_index: directive.sequence_index(),
                    samples_requested: directive.sample_count() as u64,
                    rows_generated: rows,
                    depends_on: directive
                        .dependencies()
                        .iter()
                        .map(|dependency| dependency.referenced_table.clone())
                        .collect(),
                });
            }

            let output = render(format, &tables)?;
            Ok((tables, output))
        })();

        report.duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok((tables, output)) => {
                info!(
                    tables = report.tables.len(),
                    rows = report.rows_total,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(GenerationResult {
                    tables,
                    output,
                    seed,
                    report,
                })
            }
            Err(err) => {
                warn!(error = %err, duration_ms = report.duration_ms, "generation failed");
                Err(err)
            }
        }
    }
}
