use crate::data::model::{KeyedDataset, Value};
use crate::error::{ConfigError, FormatError, Result};
use crate::format::{format_number, FormatOptions};

use super::{Statistic, StatisticConfig, SummaryResult, SummaryValue};

/// Compute `config.statistic` over `primary` and format it.
///
/// Missing cells are dropped from both datasets first. An empty primary
/// dataset yields `0` for `count` and `NA` for everything else. `aux` is the
/// numerator, second column or weight, depending on the statistic; `None`
/// behaves like an empty column.
pub fn compute_value(
    primary: &KeyedDataset,
    aux: Option<&KeyedDataset>,
    config: &StatisticConfig,
) -> Result<SummaryResult> {
    let primary = primary.without_missing();
    let aux = aux.map(KeyedDataset::without_missing).unwrap_or_default();

    let value = evaluate(&primary, &aux, config.statistic)?;
    log::debug!(
        "{} over {} rows ({} auxiliary) = {value}",
        config.statistic.name(),
        primary.len(),
        aux.len()
    );

    Ok(SummaryResult {
        value,
        formatted: format_summary(value, &config.format)?,
    })
}

/// The raw statistic over already-cleaned datasets.
pub(crate) fn evaluate(
    primary: &KeyedDataset,
    aux: &KeyedDataset,
    statistic: Statistic,
) -> Result<SummaryValue, ConfigError> {
    if primary.is_empty() {
        return Ok(match statistic {
            Statistic::Count => SummaryValue::Number(0.0),
            _ => SummaryValue::Na,
        });
    }

    let n = primary.len() as f64;
    let value = match statistic {
        Statistic::Count => SummaryValue::Number(n),
        Statistic::Sum => SummaryValue::Number(sum(&primary.numbers())),
        Statistic::Mean => SummaryValue::Number(sum(&primary.numbers()) / n),
        Statistic::Min => min(&primary.numbers()).map_or(SummaryValue::Na, SummaryValue::Number),
        Statistic::Max => max(&primary.numbers()).map_or(SummaryValue::Na, SummaryValue::Number),
        Statistic::Quantile { q } => {
            quantile(primary.numbers(), q).map_or(SummaryValue::Na, SummaryValue::Number)
        }
        Statistic::PctTotal => {
            let shared = aux.keys().filter(|k| primary.contains_key(k)).count();
            SummaryValue::Number(shared as f64 / n)
        }
        Statistic::SumPctTotal => ratio(sum(&aux.numbers()), sum(&primary.numbers())),
        Statistic::SumRatio => ratio(sum(&primary.numbers()), sum(&aux.numbers())),
        Statistic::WtMean => weighted_mean(primary, aux)?,
    };
    Ok(value)
}

/// Render a summary value; `NA` is never passed to the formatter.
pub fn format_summary(value: SummaryValue, options: &FormatOptions) -> Result<String, FormatError> {
    match value {
        SummaryValue::Number(v) => format_number(v, options),
        SummaryValue::Na => Ok("NA".to_string()),
    }
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Linear interpolation between order statistics (R type 7).
///
/// `pos = (n - 1) * q`; the result interpolates between the sorted values at
/// `floor(pos)` and the next index, or is the value at `floor(pos)` when
/// there is no next index.
pub fn quantile(mut values: Vec<f64>, q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let pos = (values.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    match values.get(base + 1) {
        Some(next) => Some(values[base] + rest * (next - values[base])),
        None => values.get(base).copied(),
    }
}

fn ratio(numerator: f64, denominator: f64) -> SummaryValue {
    if denominator == 0.0 {
        SummaryValue::Na
    } else {
        SummaryValue::Number(numerator / denominator)
    }
}

/// Σ(value × weight) / Σ weight over the primary keys; a key without a weight
/// contributes nothing.
fn weighted_mean(primary: &KeyedDataset, weight: &KeyedDataset) -> Result<SummaryValue, ConfigError> {
    if primary.len() != weight.len() {
        return Err(ConfigError::WeightLengthMismatch {
            primary: primary.len(),
            weight: weight.len(),
        });
    }

    let weighted: f64 = primary
        .iter()
        .map(|(key, value)| {
            let v = value.as_f64().unwrap_or(0.0);
            let w = weight.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            v * w
        })
        .sum();
    let total = sum(&weight.numbers());

    if total == 0.0 {
        return Ok(SummaryValue::Na);
    }
    let mean = weighted / total;
    Ok(if mean.is_finite() {
        SummaryValue::Number(mean)
    } else {
        SummaryValue::Na
    })
}
