use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::data::model::{KeyedDataset, Value};
use crate::error::Result;
use crate::format::format_number;

use super::{SortOrder, TextConfig, TextStatistic};

/// Result of a text statistic.
///
/// An empty input produces `Zero` rather than an empty string; it displays
/// and serialises as the number `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSummary {
    Zero,
    Text(String),
}

impl TextSummary {
    pub fn as_str(&self) -> &str {
        match self {
            TextSummary::Zero => "0",
            TextSummary::Text(s) => s,
        }
    }
}

impl fmt::Display for TextSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TextSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TextSummary::Zero => serializer.serialize_u8(0),
            TextSummary::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Compute a text statistic over `primary`; missing cells are ignored.
///
/// There is no auxiliary column: no text statistic reads a numerator, second
/// column or weight.
pub fn compute_text(primary: &KeyedDataset, config: &TextConfig) -> Result<TextSummary> {
    let values: Vec<&Value> = primary.values().filter(|v| !v.is_missing()).collect();
    if values.is_empty() {
        return Ok(TextSummary::Zero);
    }
    log::debug!("text {:?} over {} rows", config.statistic, values.len());

    let text = match &config.statistic {
        TextStatistic::Count => format_number(values.len() as f64, &config.format.as_decimal())?,
        TextStatistic::Unique => {
            let distinct: HashSet<&Value> = values.iter().copied().collect();
            format_number(distinct.len() as f64, &config.format.as_decimal())?
        }
        TextStatistic::First => values[0].to_string(),
        TextStatistic::Last => values[values.len() - 1].to_string(),
        TextStatistic::Min => sorted(&values, config.sort)[0].to_string(),
        TextStatistic::Max => {
            let sorted = sorted(&values, config.sort);
            sorted[sorted.len() - 1].to_string()
        }
        TextStatistic::Mode => mode(&values).to_string(),
        TextStatistic::Concatenate { delimiter } => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(delimiter),
    };
    Ok(TextSummary::Text(text))
}

fn sorted<'a>(values: &[&'a Value], order: SortOrder) -> Vec<&'a Value> {
    let mut out = values.to_vec();
    match order {
        SortOrder::Ascending => out.sort(),
        SortOrder::Descending => out.sort_by(|a, b| b.cmp(a)),
    }
    out
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: &[&'a Value]) -> &'a Value {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for v in values {
        *counts.entry(*v).or_default() += 1;
    }

    let mut best = values[0];
    let mut best_count = 0;
    for v in values {
        let count = counts[*v];
        if count > best_count {
            best = *v;
            best_count = count;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatOptions;

    fn names() -> KeyedDataset {
        KeyedDataset::from_values(["pear", "apple", "fig", "apple", "pear"])
    }

    fn text(ds: &KeyedDataset, statistic: TextStatistic) -> String {
        compute_text(ds, &TextConfig::new(statistic)).unwrap().to_string()
    }

    #[test]
    fn positional_statistics() {
        assert_eq!(text(&names(), TextStatistic::First), "pear");
        assert_eq!(text(&names(), TextStatistic::Last), "pear");
        let ds = KeyedDataset::from_values(["a", "b", "c"]);
        assert_eq!(text(&ds, TextStatistic::Last), "c");
    }

    #[test]
    fn min_and_max_follow_sort_order() {
        assert_eq!(text(&names(), TextStatistic::Min), "apple");
        assert_eq!(text(&names(), TextStatistic::Max), "pear");

        let mut desc = TextConfig::new(TextStatistic::Min);
        desc.sort = SortOrder::Descending;
        assert_eq!(compute_text(&names(), &desc).unwrap().to_string(), "pear");
    }

    #[test]
    fn counts_are_decimal_formatted() {
        let many = KeyedDataset::from_values(vec!["x"; 1200]);
        assert_eq!(text(&many, TextStatistic::Count), "1,200");
        assert_eq!(text(&names(), TextStatistic::Unique), "3");

        let mut de = TextConfig::new(TextStatistic::Count);
        de.format = FormatOptions::default().locale("de-DE");
        assert_eq!(compute_text(&many, &de).unwrap().to_string(), "1.200");
    }

    #[test]
    fn mode_breaks_ties_by_first_occurrence() {
        assert_eq!(text(&names(), TextStatistic::Mode), "pear");
        let ds = KeyedDataset::from_values(["b", "a", "a", "b"]);
        assert_eq!(text(&ds, TextStatistic::Mode), "b");
    }

    #[test]
    fn concatenate_joins_with_delimiter() {
        let ds = KeyedDataset::from_values(["a", "b", "c"]);
        assert_eq!(
            text(&ds, TextStatistic::Concatenate { delimiter: ", ".into() }),
            "a, b, c"
        );
        let nums = KeyedDataset::from_values([1.0, 2.5]);
        assert_eq!(
            text(&nums, TextStatistic::Concatenate { delimiter: "/".into() }),
            "1/2.5"
        );
    }

    #[test]
    fn empty_input_is_numeric_zero() {
        let empty = KeyedDataset::new();
        let result = compute_text(&empty, &TextConfig::new(TextStatistic::First)).unwrap();
        assert_eq!(result, TextSummary::Zero);
        assert_eq!(result.to_string(), "0");
        assert_eq!(serde_json::to_string(&result).unwrap(), "0");

        let only_missing = KeyedDataset::from_values([Value::Missing]);
        assert_eq!(
            compute_text(&only_missing, &TextConfig::new(TextStatistic::Mode)).unwrap(),
            TextSummary::Zero
        );
    }
}
