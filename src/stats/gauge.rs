use serde::Serialize;

use crate::data::model::KeyedDataset;
use crate::error::Result;
use crate::format::locale::language;

use super::numeric::{self, evaluate, format_summary};
use super::{Statistic, StatisticConfig, SummaryValue};

/// Gauge configuration: the statistic plus optional fixed bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeConfig {
    pub statistic: StatisticConfig,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GaugeConfig {
    pub fn new(statistic: StatisticConfig) -> Self {
        Self {
            statistic,
            min: None,
            max: None,
        }
    }
}

/// Everything the gauge draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSummary {
    pub value: SummaryValue,
    pub formatted: String,
    pub min: f64,
    pub max: f64,
    pub min_formatted: String,
    pub max_formatted: String,
    /// Empty unless the value falls outside `[min, max]`.
    pub footnote: String,
    /// Share of the arc to fill, in `[0, 1]`.
    pub fraction: f64,
}

/// Compute the gauge value, its bounds and the out-of-range footnote.
pub fn compute_gauge(
    primary: &KeyedDataset,
    aux: Option<&KeyedDataset>,
    config: &GaugeConfig,
) -> Result<GaugeSummary> {
    let primary = primary.without_missing();
    let aux = aux.map(KeyedDataset::without_missing).unwrap_or_default();
    let stat = &config.statistic;

    let value = evaluate(&primary, &aux, stat.statistic)?;
    let (default_min, default_max) = default_bounds(&primary, stat.statistic);
    let min = config.min.or(default_min).unwrap_or(0.0);
    let max = config.max.or(default_max).unwrap_or(1.0);
    log::debug!(
        "gauge {} over {} rows = {value} in [{min}, {max}]",
        stat.statistic.name(),
        primary.len()
    );

    Ok(GaugeSummary {
        value,
        formatted: format_summary(value, &stat.format)?,
        min,
        max,
        min_formatted: format_summary(SummaryValue::Number(min), &stat.format)?,
        max_formatted: format_summary(SummaryValue::Number(max), &stat.format)?,
        footnote: bounds_footnote(value, min, max, &stat.format.locale).to_string(),
        fraction: fill_fraction(value, min, max),
    })
}

/// Bounds implied by the statistic when none are configured; `None` where
/// the data cannot determine one.
pub fn default_bounds(primary: &KeyedDataset, statistic: Statistic) -> (Option<f64>, Option<f64>) {
    let values = primary.numbers();
    let n = primary.len() as f64;
    match statistic {
        Statistic::Count => (Some(0.0), Some(n + 1.0)),
        Statistic::Sum => (
            numeric::min(&values).map(|m| m * n),
            numeric::max(&values).map(|m| m * n),
        ),
        Statistic::Mean | Statistic::WtMean => (numeric::min(&values), numeric::max(&values)),
        Statistic::Quantile { .. } => (
            numeric::quantile(values.clone(), 0.0),
            numeric::quantile(values, 1.0),
        ),
        Statistic::Min
        | Statistic::Max
        | Statistic::PctTotal
        | Statistic::SumPctTotal
        | Statistic::SumRatio => (Some(0.0), Some(1.0)),
    }
}

/// Note shown under the gauge when the value is outside its bounds. French
/// locales get French text, everything else English.
pub fn bounds_footnote(value: SummaryValue, min: f64, max: f64, locale: &str) -> &'static str {
    let Some(v) = value.as_f64() else {
        return "";
    };
    let french = language(locale) == "fr";
    if v < min {
        if french {
            "NOTE : La valeur ciblée est inférieure à la valeur minimale."
        } else {
            "NOTE: Target value is less than the minimum value"
        }
    } else if v > max {
        if french {
            "NOTE : La valeur ciblée est supérieure à la valeur maximale."
        } else {
            "NOTE: Target value exceeds the maximum value"
        }
    } else {
        ""
    }
}

/// `(value - min) / (max - min)` clamped to `[0, 1]`. `NA`, or a value
/// sitting exactly on equal bounds, gives an empty gauge.
pub fn fill_fraction(value: SummaryValue, min: f64, max: f64) -> f64 {
    let Some(v) = value.as_f64() else {
        return 0.0;
    };
    let span = max - min;
    let fraction = (v - min) / span;
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatOptions, NumberFormat};

    fn gauge(statistic: Statistic) -> GaugeConfig {
        GaugeConfig::new(StatisticConfig::new(
            statistic,
            FormatOptions::new(NumberFormat::Decimal),
        ))
    }

    #[test]
    fn sum_bounds_scale_extremes_by_row_count() {
        let ds = KeyedDataset::from_values([2.0, 3.0]);
        let g = compute_gauge(&ds, None, &gauge(Statistic::Sum)).unwrap();
        assert_eq!(g.value, SummaryValue::Number(5.0));
        assert_eq!((g.min, g.max), (4.0, 6.0));
        assert_eq!(g.footnote, "");
        assert_eq!(g.fraction, 0.5);
        assert_eq!((g.min_formatted.as_str(), g.max_formatted.as_str()), ("4", "6"));
    }

    #[test]
    fn default_bounds_per_statistic() {
        let ds = KeyedDataset::from_values([1.0, 5.0, 3.0]);
        assert_eq!(default_bounds(&ds, Statistic::Count), (Some(0.0), Some(4.0)));
        assert_eq!(default_bounds(&ds, Statistic::Mean), (Some(1.0), Some(5.0)));
        assert_eq!(
            default_bounds(&ds, Statistic::Quantile { q: 0.3 }),
            (Some(1.0), Some(5.0))
        );
        assert_eq!(default_bounds(&ds, Statistic::PctTotal), (Some(0.0), Some(1.0)));
        assert_eq!(default_bounds(&KeyedDataset::new(), Statistic::Mean), (None, None));
    }

    #[test]
    fn explicit_bounds_override_defaults() {
        let ds = KeyedDataset::from_values([2.0, 3.0]);
        let mut config = gauge(Statistic::Sum);
        config.min = Some(0.0);
        config.max = Some(4.0);
        let g = compute_gauge(&ds, None, &config).unwrap();
        assert_eq!((g.min, g.max), (0.0, 4.0));
        assert_eq!(g.footnote, "NOTE: Target value exceeds the maximum value");
        assert_eq!(g.fraction, 1.0);
    }

    #[test]
    fn footnote_language() {
        let v = SummaryValue::Number(-1.0);
        assert_eq!(
            bounds_footnote(v, 0.0, 1.0, "fr-CA"),
            "NOTE : La valeur ciblée est inférieure à la valeur minimale."
        );
        assert_eq!(
            bounds_footnote(SummaryValue::Number(2.0), 0.0, 1.0, "fr"),
            "NOTE : La valeur ciblée est supérieure à la valeur maximale."
        );
        assert_eq!(
            bounds_footnote(v, 0.0, 1.0, "de-DE"),
            "NOTE: Target value is less than the minimum value"
        );
        assert_eq!(bounds_footnote(SummaryValue::Na, 0.0, 1.0, "en-US"), "");
    }

    #[test]
    fn empty_data_falls_back_to_unit_bounds() {
        let g = compute_gauge(&KeyedDataset::new(), None, &gauge(Statistic::Mean)).unwrap();
        assert_eq!(g.value, SummaryValue::Na);
        assert_eq!(g.formatted, "NA");
        assert_eq!((g.min, g.max), (0.0, 1.0));
        assert_eq!(g.footnote, "");
        assert_eq!(g.fraction, 0.0);
    }

    #[test]
    fn fill_fraction_is_clamped() {
        assert_eq!(fill_fraction(SummaryValue::Number(15.0), 0.0, 10.0), 1.0);
        assert_eq!(fill_fraction(SummaryValue::Number(-3.0), 0.0, 10.0), 0.0);
        assert_eq!(fill_fraction(SummaryValue::Number(2.5), 0.0, 10.0), 0.25);
        assert_eq!(fill_fraction(SummaryValue::Number(3.0), 3.0, 3.0), 0.0);
    }
}
