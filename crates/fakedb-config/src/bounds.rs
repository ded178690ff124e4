use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::errors::{ConfigError, ConfigPath, Result};
use crate::model::{BaseKind, ValueBounds, ValueRange};

/// Parse an ISO-8601 timestamp, falling back to a bare date at midnight.
pub fn parse_timestamp_value(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Validate `{start, end}` for a base kind. `path` points at the `value` key.
pub fn parse_range(kind: BaseKind, bounds: &ValueBounds, path: &ConfigPath) -> Result<ValueRange> {
    let range = match kind {
        BaseKind::Datetime => {
            let start = timestamp_bound(&bounds.start, &path.join("start"))?;
            let end = timestamp_bound(&bounds.end, &path.join("end"))?;
            if start > end {
                return Err(ConfigError::configuration(
                    path,
                    format!("start value {start} is greater than end {end}"),
                ));
            }
            ValueRange::Temporal { start, end }
        }
        BaseKind::Integer | BaseKind::Float | BaseKind::Boolean => {
            let start = numeric_bound(&bounds.start, &path.join("start"))?;
            let end = numeric_bound(&bounds.end, &path.join("end"))?;
            if start > end {
                return Err(ConfigError::configuration(
                    path,
                    format!("start value {start} is greater than end {end}"),
                ));
            }
            ValueRange::Numeric { start, end }
        }
    };
    Ok(range)
}

fn numeric_bound(value: &Value, path: &ConfigPath) -> Result<f64> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ConfigError::configuration(path, format!("expected a number, found {value}")))
}

fn timestamp_bound(value: &Value, path: &ConfigPath) -> Result<NaiveDateTime> {
    value
        .as_str()
        .and_then(parse_timestamp_value)
        .ok_or_else(|| {
            ConfigError::configuration(path, format!("expected an ISO-8601 timestamp, found {value}"))
        })
}
