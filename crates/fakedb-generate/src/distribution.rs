//! Numeric sampling from a named shape, rescaled into a target range.

use rand::{Rng, RngCore};
use rand_distr::{LogNormal, StandardNormal};

use fakedb_config::{DistributionShape, DistributionSpec};

use crate::errors::GenerationError;

/// Draw `count` samples shaped by `spec` and mapped onto `[min, max]`.
///
/// The smallest raw sample of the batch lands on `min` and the largest on
/// `max`. A batch without spread (one sample, or identical draws) yields the
/// midpoint. `min == max` yields `count` copies of that value.
pub fn generate(
    spec: &DistributionSpec,
    min: f64,
    max: f64,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, GenerationError> {
    if !(min <= max) {
        return Err(GenerationError::InvalidRange { min, max });
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    if min == max {
        return Ok(vec![min; count]);
    }

    let raw = draw(spec, count, rng)?;
    let (raw_min, raw_max) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(*value), hi.max(*value))
        });
    let spread = raw_max - raw_min;
    if !(spread > 0.0) || !spread.is_finite() {
        let midpoint = min + (max - min) / 2.0;
        return Ok(vec![midpoint; count]);
    }

    let scale = (max - min) / spread;
    Ok(raw
        .into_iter()
        .map(|value| (min + (value - raw_min) * scale).clamp(min, max))
        .collect())
}

fn draw(
    spec: &DistributionSpec,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>, GenerationError> {
    match spec.shape {
        DistributionShape::Normal => Ok((0..count)
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect()),
        DistributionShape::Log => {
            let shape = LogNormal::new(0.0, spec.sigma).map_err(|err| {
                GenerationError::InvalidGenerator(format!(
                    "log distribution with sigma {}: {err}",
                    spec.sigma
                ))
            })?;
            Ok((0..count).map(|_| rng.sample(shape)).collect())
        }
    }
}
