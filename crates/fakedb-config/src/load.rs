use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;

/// Load a configuration document from a `.json` or `.toml` file.
///
/// Files without a `.toml` extension are read as JSON.
pub fn load_config_file(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    debug!(path = %path.display(), toml = is_toml, "loading configuration");
    parse_config_str(&raw, is_toml)
}

pub fn parse_config_str(raw: &str, is_toml: bool) -> Result<Value> {
    if is_toml {
        Ok(toml::from_str(raw)?)
    } else {
        Ok(serde_json::from_str(raw)?)
    }
}
