use std::fmt;

use thiserror::Error;

/// Dotted key path into a configuration document (`data_types.base_types.int`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path extended by one key.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("root")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

/// Non-fatal configuration finding with location and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(
        code: impl Into<String>,
        path: &ConfigPath,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.to_string(),
            message: message.into(),
            hint,
        }
    }
}

/// Errors raised while loading, validating or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error at {path}: {message}")]
    Configuration { path: ConfigPath, message: String },
    #[error("unrecognized type '{type_name}' at {path}")]
    UnrecognizedType { path: ConfigPath, type_name: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn configuration(path: &ConfigPath, message: impl Into<String>) -> Self {
        ConfigError::Configuration {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn unrecognized_type(path: &ConfigPath, type_name: impl Into<String>) -> Self {
        ConfigError::UnrecognizedType {
            path: path.clone(),
            type_name: type_name.into(),
        }
    }

    /// Location of the offending key, when the error has one.
    pub fn path(&self) -> Option<&ConfigPath> {
        match self {
            ConfigError::Configuration { path, .. } | ConfigError::UnrecognizedType { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
