use rand::RngCore;
use serde_json::Value;

use fakedb_config::DistributionSpec;

use crate::distribution;
use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

/// Picks members of a fixed value list.
///
/// Indexes are drawn from the distribution over `[0, len]`, so pick density
/// follows the distribution shape rather than being uniform.
#[derive(Debug, Clone)]
pub struct CollectionGenerator {
    values: Vec<GeneratedValue>,
    distribution: DistributionSpec,
}

impl CollectionGenerator {
    pub fn new(values: &[Value], distribution: DistributionSpec) -> Result<Self, GenerationError> {
        if values.is_empty() {
            return Err(GenerationError::InvalidGenerator(
                "collection must contain at least one value".to_string(),
            ));
        }
        Ok(Self {
            values: values.iter().map(GeneratedValue::from_json).collect(),
            distribution,
        })
    }

    pub fn values(&self) -> &[GeneratedValue] {
        &self.values
    }

    pub fn generate(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        let last = self.values.len() - 1;
        let indexes = distribution::generate(
            &self.distribution,
            0.0,
            self.values.len() as f64,
            count,
            rng,
        )?;
        Ok(indexes
            .into_iter()
            .map(|index| self.values[(index.trunc() as usize).min(last)].clone())
            .collect())
    }
}
