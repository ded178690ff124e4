mod artifacts;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use fakedb_config::{ConfigError, config_json_schema, default_config, load_config_file};
use fakedb_core::Schema;
use fakedb_generate::{GenerateOptions, GenerationEngine, GenerationError, OutputFormat};
use serde_json::Value;
use thiserror::Error;

use artifacts::{ArtifactError, init_logging, write_csv_tables, write_json, write_text};

const DEFAULT_SQL_OUTPUT: &str = "output.sql";
const DEFAULT_CSV_OUTPUT: &str = "output";

#[derive(Debug, Error)]
enum CliError {
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid schema file {path}: {source}")]
    Schema {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "fakedatagen", version, about = "Fake relational data generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate rows for every table of a schema.
    Generate(GenerateArgs),
    /// Print the built-in default configuration.
    DefaultConfig(PrintArgs),
    /// Print the JSON Schema of configuration documents.
    ConfigSchema(PrintArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema document (JSON).
    #[arg(short = 'd', long = "schema", value_name = "SCHEMA")]
    schema: PathBuf,
    /// User configuration (JSON or TOML).
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// Output file for SQL, or directory for CSV.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(short = 'f', long = "format", default_value_t = OutputFormat::Sql)]
    format: OutputFormat,
    /// Replace the built-in default configuration.
    #[arg(long = "default-config", value_name = "PATH")]
    default_config: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Append JSON logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Write the generation report as JSON.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Write to a file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::DefaultConfig(args) => print_json(&default_config(), args.output.as_deref()),
        Command::ConfigSchema(args) => {
            let schema = serde_json::to_value(config_json_schema())?;
            print_json(&schema, args.output.as_deref())
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_logging(args.log_file.as_deref())?;
    let timer = Instant::now();

    let schema = load_schema(&args.schema)?;
    let user_config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => Value::Object(Default::default()),
    };
    let defaults = match &args.default_config {
        Some(path) => load_config_file(path)?,
        None => default_config(),
    };

    tracing::info!(
        schema = %args.schema.display(),
        tables = schema.tables.len(),
        "schema loaded"
    );

    let engine = GenerationEngine::new(GenerateOptions {
        seed: args.seed,
        format: args.format,
    });
    let result = engine.run(&schema, &user_config, &defaults)?;

    let output = output_path(args.output, args.format);
    match args.format {
        OutputFormat::Sql => {
            write_text(&output, &result.output.joined())?;
            tracing::info!(path = %output.display(), "sql written");
        }
        OutputFormat::Csv => {
            for path in write_csv_tables(&output, &result.output)? {
                tracing::info!(path = %path.display(), "csv written");
            }
        }
    }

    if let Some(path) = &args.report {
        write_json(path, &result.report)?;
        tracing::info!(path = %path.display(), "report written");
    }

    tracing::info!(
        seed = result.seed,
        rows = result.report.rows_total,
        duration_ms = timer.elapsed().as_millis() as u64,
        "run finished"
    );
    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

fn output_path(output: Option<PathBuf>, format: OutputFormat) -> PathBuf {
    output.unwrap_or_else(|| match format {
        OutputFormat::Sql => PathBuf::from(DEFAULT_SQL_OUTPUT),
        OutputFormat::Csv => PathBuf::from(DEFAULT_CSV_OUTPUT),
    })
}

fn print_json(value: &Value, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => write_json(path, value)?,
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_defaults_to_sql() {
        let cli = Cli::try_parse_from(["fakedatagen", "generate", "-d", "schema.json"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.format, OutputFormat::Sql);
        assert!(args.config.is_none());
        assert_eq!(
            output_path(args.output, args.format),
            PathBuf::from("output.sql")
        );
    }

    #[test]
    fn generate_accepts_all_flags() {
        let cli = Cli::try_parse_from([
            "fakedatagen",
            "generate",
            "-d",
            "schema.json",
            "-c",
            "config.toml",
            "-o",
            "out",
            "-f",
            "CSV",
            "--seed",
            "42",
            "--default-config",
            "defaults.json",
            "--log-file",
            "run.ndjson",
            "--report",
            "report.json",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.config, Some(PathBuf::from("config.toml")));
        assert_eq!(args.default_config, Some(PathBuf::from("defaults.json")));
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = Cli::try_parse_from(["fakedatagen", "generate", "-d", "s.json", "-f", "xml"])
            .unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn csv_output_defaults_to_directory() {
        assert_eq!(
            output_path(None, OutputFormat::Csv),
            PathBuf::from("output")
        );
    }

    #[test]
    fn missing_schema_file_reports_path() {
        let err = load_schema(Path::new("/nonexistent/fakedb/schema.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fakedb/schema.json"));
    }
}
