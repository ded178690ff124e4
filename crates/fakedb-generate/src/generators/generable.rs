use rand::{Rng, RngCore};
use rand_regex::Regex as RandRegex;

use fakedb_config::GENERATOR_MAX_REPEAT;

use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

/// Renders strings matching a generator expression.
#[derive(Debug, Clone)]
pub struct GenerableGenerator {
    expression: String,
    regex: RandRegex,
}

impl GenerableGenerator {
    pub fn new(expression: &str) -> Result<Self, GenerationError> {
        let regex = RandRegex::compile(expression, GENERATOR_MAX_REPEAT).map_err(|err| {
            GenerationError::InvalidGenerator(format!(
                "invalid generator expression '{expression}': {err}"
            ))
        })?;
        Ok(Self {
            expression: expression.to_string(),
            regex,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Vec<GeneratedValue> {
        (0..count)
            .map(|_| {
                let value: String = rng.sample(&self.regex);
                GeneratedValue::Text(value)
            })
            .collect()
    }
}
