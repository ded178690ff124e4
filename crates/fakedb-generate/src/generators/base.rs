use chrono::Duration;
use rand::RngCore;

use fakedb_config::{BaseKind, DistributionSpec, ValueRange};

use crate::distribution;
use crate::errors::GenerationError;
use crate::generators::GeneratedValue;

/// Numeric, boolean and datetime sampler over a configured range.
#[derive(Debug, Clone)]
pub struct BaseGenerator {
    kind: BaseKind,
    range: ValueRange,
    distribution: DistributionSpec,
}

impl BaseGenerator {
    pub fn new(
        kind: BaseKind,
        range: ValueRange,
        distribution: DistributionSpec,
    ) -> Result<Self, GenerationError> {
        let compatible = matches!(
            (kind, range),
            (BaseKind::Datetime, ValueRange::Temporal { .. })
                | (
                    BaseKind::Integer | BaseKind::Float | BaseKind::Boolean,
                    ValueRange::Numeric { .. }
                )
        );
        if !compatible {
            return Err(GenerationError::InvalidGenerator(format!(
                "{} field cannot use range {range:?}",
                kind.as_str()
            )));
        }
        Ok(Self {
            kind,
            range,
            distribution,
        })
    }

    pub fn kind(&self) -> BaseKind {
        self.kind
    }

    pub fn generate(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<GeneratedValue>, GenerationError> {
        match self.range {
            ValueRange::Numeric { start, end } => {
                let samples = distribution::generate(&self.distribution, start, end, count, rng)?;
                Ok(self.project_numeric(samples))
            }
            ValueRange::Temporal { start, end } => {
                let duration = (end - start).num_seconds() as f64;
                let offsets =
                    distribution::generate(&self.distribution, 0.0, duration, count, rng)?;
                Ok(offsets
                    .into_iter()
                    .map(|offset| GeneratedValue::Timestamp(start + Duration::seconds(offset as i64)))
                    .collect())
            }
        }
    }

    fn project_numeric(&self, samples: Vec<f64>) -> Vec<GeneratedValue> {
        match self.kind {
            BaseKind::Integer => samples
                .into_iter()
                .map(|sample| GeneratedValue::Int(sample.trunc() as i64))
                .collect(),
            // true marks samples strictly above the batch mean, so the share of
            // true values follows the distribution shape.
            BaseKind::Boolean => {
                let mean = samples.iter().sum::<f64>() / samples.len().max(1) as f64;
                samples
                    .into_iter()
                    .map(|sample| GeneratedValue::Bool(sample > mean))
                    .collect()
            }
            BaseKind::Float | BaseKind::Datetime => {
                samples.into_iter().map(GeneratedValue::Float).collect()
            }
        }
    }
}
