/// Statistic engine: summary values over (possibly filtered) keyed data.
///
/// ```text
///   KeyedDataset (primary)      KeyedDataset (numerator / column2 / weight)
///            │                              │
///            └──────────────┬───────────────┘
///                           ▼
///                ┌────────────────────┐
///                │  numeric::compute   │  Statistic → SummaryValue (number | NA)
///                └────────────────────┘
///                           │
///                           ▼
///                ┌────────────────────┐
///                │      format        │  FormatOptions → display string
///                └────────────────────┘
/// ```
///
/// `text` covers the text span statistics and `gauge` adds the min/max bounds
/// the gauge draws against.

pub mod gauge;
pub mod numeric;
pub mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::data::model::plain_number;
use crate::error::ConfigError;
use crate::format::FormatOptions;

pub use gauge::{compute_gauge, GaugeConfig, GaugeSummary};
pub use numeric::compute_value;
pub use text::{compute_text, TextSummary};

/// Quantile fraction used when a quantile statistic does not name one.
pub const DEFAULT_QUANTILE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Numeric statistics
// ---------------------------------------------------------------------------

/// Which auxiliary column a statistic reads besides the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxRole {
    /// Subset of rows (`pct_total`) or their values (`sum_pct_total`).
    Numerator,
    /// Parallel denominator column (`sum_ratio`).
    Column2,
    Weight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Quantile { q: f64 },
    /// Share of primary rows also present in the numerator.
    PctTotal,
    /// Σ numerator / Σ primary.
    SumPctTotal,
    /// Σ primary / Σ column2.
    SumRatio,
    /// Weighted mean of primary by the weight column.
    WtMean,
}

impl Statistic {
    /// Parse a statistic name; `quantile` takes its fraction from `q`.
    pub fn parse(name: &str, q: Option<f64>) -> Result<Self, ConfigError> {
        let stat = match name {
            "count" => Statistic::Count,
            "sum" => Statistic::Sum,
            "mean" => Statistic::Mean,
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            "quantile" => {
                let q = q.unwrap_or(DEFAULT_QUANTILE);
                if !(0.0..=1.0).contains(&q) {
                    return Err(ConfigError::QuantileOutOfRange(q));
                }
                Statistic::Quantile { q }
            }
            "pct_total" => Statistic::PctTotal,
            "sum_pct_total" => Statistic::SumPctTotal,
            "sum_ratio" => Statistic::SumRatio,
            "wt_mean" => Statistic::WtMean,
            other => return Err(ConfigError::UnknownStatistic(other.to_string())),
        };
        Ok(stat)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Sum => "sum",
            Statistic::Mean => "mean",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Quantile { .. } => "quantile",
            Statistic::PctTotal => "pct_total",
            Statistic::SumPctTotal => "sum_pct_total",
            Statistic::SumRatio => "sum_ratio",
            Statistic::WtMean => "wt_mean",
        }
    }

    pub fn aux_role(&self) -> Option<AuxRole> {
        match self {
            Statistic::PctTotal | Statistic::SumPctTotal => Some(AuxRole::Numerator),
            Statistic::SumRatio => Some(AuxRole::Column2),
            Statistic::WtMean => Some(AuxRole::Weight),
            _ => None,
        }
    }
}

/// Statistic plus display options for the numeric widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticConfig {
    pub statistic: Statistic,
    pub format: FormatOptions,
}

impl StatisticConfig {
    pub fn new(statistic: Statistic, format: FormatOptions) -> Self {
        Self { statistic, format }
    }
}

/// A numeric summary, or `NA` when the statistic is undefined for the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryValue {
    Number(f64),
    Na,
}

impl SummaryValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SummaryValue::Number(v) => Some(*v),
            SummaryValue::Na => None,
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, SummaryValue::Na)
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Number(v) => f.write_str(&plain_number(*v)),
            SummaryValue::Na => f.write_str("NA"),
        }
    }
}

impl Serialize for SummaryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SummaryValue::Number(v) => serializer.serialize_f64(*v),
            SummaryValue::Na => serializer.serialize_str("NA"),
        }
    }
}

/// Value plus its display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub value: SummaryValue,
    pub formatted: String,
}

// ---------------------------------------------------------------------------
// Text statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextStatistic {
    Count,
    First,
    Last,
    Min,
    Max,
    Mode,
    Concatenate { delimiter: String },
    Unique,
}

impl TextStatistic {
    /// Parse a text statistic name; `concatenate` joins with `delimiter`
    /// (`,` when absent).
    pub fn parse(name: &str, delimiter: Option<&str>) -> Result<Self, ConfigError> {
        let stat = match name {
            "count" => TextStatistic::Count,
            "first" => TextStatistic::First,
            "last" => TextStatistic::Last,
            "min" => TextStatistic::Min,
            "max" => TextStatistic::Max,
            "mode" => TextStatistic::Mode,
            "concatenate" => TextStatistic::Concatenate {
                delimiter: delimiter.unwrap_or(",").to_string(),
            },
            "unique" => TextStatistic::Unique,
            other => return Err(ConfigError::UnknownStatistic(other.to_string())),
        };
        Ok(stat)
    }
}

/// Ordering used by the text `min` / `max` statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(ConfigError::UnknownSortOrder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextConfig {
    pub statistic: TextStatistic,
    pub sort: SortOrder,
    /// Used for `count` and `unique`, rendered as decimals.
    pub format: FormatOptions,
}

impl TextConfig {
    pub fn new(statistic: TextStatistic) -> Self {
        Self {
            statistic,
            sort: SortOrder::Ascending,
            format: FormatOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_statistics() {
        assert_eq!(Statistic::parse("wt_mean", None), Ok(Statistic::WtMean));
        assert_eq!(
            Statistic::parse("quantile", Some(0.9)),
            Ok(Statistic::Quantile { q: 0.9 })
        );
        assert_eq!(
            Statistic::parse("quantile", None),
            Ok(Statistic::Quantile { q: DEFAULT_QUANTILE })
        );
        assert_eq!(
            Statistic::parse("quantile", Some(1.5)),
            Err(ConfigError::QuantileOutOfRange(1.5))
        );
        assert_eq!(
            Statistic::parse("median", None),
            Err(ConfigError::UnknownStatistic("median".into()))
        );
    }

    #[test]
    fn aux_roles() {
        assert_eq!(Statistic::PctTotal.aux_role(), Some(AuxRole::Numerator));
        assert_eq!(Statistic::SumPctTotal.aux_role(), Some(AuxRole::Numerator));
        assert_eq!(Statistic::SumRatio.aux_role(), Some(AuxRole::Column2));
        assert_eq!(Statistic::WtMean.aux_role(), Some(AuxRole::Weight));
        assert_eq!(Statistic::Mean.aux_role(), None);
    }

    #[test]
    fn text_statistics() {
        assert_eq!(
            TextStatistic::parse("concatenate", None),
            Ok(TextStatistic::Concatenate {
                delimiter: ",".into()
            })
        );
        assert_eq!(
            TextStatistic::parse("concatenate", Some(" | ")),
            Ok(TextStatistic::Concatenate {
                delimiter: " | ".into()
            })
        );
        assert!(TextStatistic::parse("sum", None).is_err());
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Descending));
    }

    #[test]
    fn summary_value_serializes_na_as_string() {
        assert_eq!(serde_json::to_string(&SummaryValue::Na).unwrap(), "\"NA\"");
        assert_eq!(serde_json::to_string(&SummaryValue::Number(2.5)).unwrap(), "2.5");
        assert_eq!(SummaryValue::Number(3.0).to_string(), "3");
    }
}
