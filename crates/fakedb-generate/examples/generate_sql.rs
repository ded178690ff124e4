use std::env;
use std::path::PathBuf;

use fakedb_config::{default_config, load_config_file};
use fakedb_core::Schema;
use fakedb_generate::{GenerateOptions, GenerationEngine, OutputFormat};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let mut schema_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => schema_path = args.next().map(PathBuf::from),
            "--config" => config_path = args.next().map(PathBuf::from),
            "--seed" => {
                let raw = args.next().ok_or("missing --seed value")?;
                options.seed = Some(raw.parse()?);
            }
            "--format" => {
                let raw = args.next().ok_or("missing --format value")?;
                options.format = raw.parse::<OutputFormat>()?;
            }
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let schema_path = schema_path.ok_or("missing --schema path")?;
    let schema: Schema = serde_json::from_str(&std::fs::read_to_string(&schema_path)?)?;
    let user_config = match config_path {
        Some(path) => load_config_file(&path)?,
        None => serde_json::json!({}),
    };

    let engine = GenerationEngine::new(options);
    let result = engine.run(&schema, &user_config, &default_config())?;

    println!("{}", result.output.joined());
    eprintln!("seed={}", result.report.seed);
    Ok(())
}
