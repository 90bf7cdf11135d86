use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Key – a row identifier shared by every widget in a crosstalk group
// ---------------------------------------------------------------------------

/// Row key in canonical textual form.
///
/// Crosstalk keys arrive as strings while positional keys are indices; both
/// live in one key space, so `Key::from(3usize) == Key::from("3")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "JsonValue")]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key(i.to_string())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key(i.to_string())
    }
}

impl From<JsonValue> for Key {
    fn from(val: JsonValue) -> Self {
        match val {
            JsonValue::String(s) => Key(s),
            other => Key(other.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell of a widget column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// `Missing` encodes "no value" (JSON `null`, NaN); missing cells never take
/// part in a statistic. `Value` is `Ord + Hash` so the text statistics can
/// sort, count and deduplicate it.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "JsonValue")]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

// -- Manual Eq/Ord so values can be sorted and used as map keys --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Bool(_) => 1,
                Number(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Number(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", plain_number(*v)),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Missing => Ok(()),
        }
    }
}

/// Shortest plain rendering of a number: integral values lose the `.0`,
/// negative zero prints as `0`.
pub fn plain_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e21 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

impl Value {
    /// Interpret the value as a number the way summation helpers coerce
    /// cells: booleans count as 1/0, numeric text parses, anything else is
    /// not a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Number(v)
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(i as f64)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Value::Missing, Value::from)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<JsonValue> for Value {
    fn from(val: JsonValue) -> Self {
        match val {
            JsonValue::Number(n) => n.as_f64().map_or(Value::Missing, Value::from),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Null => Value::Missing,
            other => Value::Text(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyedDataset – one widget column indexed by row key
// ---------------------------------------------------------------------------

/// Mapping from row key to value, kept in insertion order.
///
/// A key is present iff its row is currently in the dataset; filtering
/// removes keys rather than blanking values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedDataset {
    entries: Vec<(Key, Value)>,
    index: HashMap<Key, usize>,
}

impl KeyedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional values and optional row keys.
    ///
    /// Without keys, each value is keyed by its index. With keys, both
    /// sequences must have the same length.
    pub fn build(values: Vec<Value>, keys: Option<Vec<Key>>) -> Result<Self, ConfigError> {
        match keys {
            None => Ok(Self::from_values(values)),
            Some(keys) => Self::with_keys(values, keys),
        }
    }

    /// Key each value by its position.
    pub fn from_values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::from(i), v.into()))
            .collect()
    }

    /// Pair values with row keys. Duplicate keys are not rejected: the later
    /// value wins.
    pub fn with_keys<V, K>(
        values: impl IntoIterator<Item = V>,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Self, ConfigError>
    where
        V: Into<Value>,
        K: Into<Key>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        if keys.len() != values.len() {
            return Err(ConfigError::KeyLengthMismatch {
                values: values.len(),
                keys: keys.len(),
            });
        }
        Ok(keys.into_iter().zip(values).collect())
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: Key, value: Value) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Row position of `key` in insertion order.
    pub fn position(&self, key: &Key) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Numeric view of the values; non-numeric cells are skipped.
    pub fn numbers(&self) -> Vec<f64> {
        self.values().filter_map(Value::as_f64).collect()
    }

    /// Copy of the dataset without missing cells.
    pub fn without_missing(&self) -> Self {
        self.iter()
            .filter(|(_, v)| !v.is_missing())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FromIterator<(Key, Value)> for KeyedDataset {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut dataset = KeyedDataset::new();
        for (key, value) in iter {
            dataset.insert(key, value);
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_keys_when_none_supplied() {
        let ds = KeyedDataset::build(vec![10.0.into(), 20.0.into()], None).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(&Key::from(0usize)), Some(&Value::Number(10.0)));
        assert_eq!(ds.get(&Key::from("1")), Some(&Value::Number(20.0)));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let ds = KeyedDataset::with_keys([1.0, 2.0], ["a", "a"]).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(&Key::from("a")), Some(&Value::Number(2.0)));
    }

    #[test]
    fn overwrite_keeps_first_position() {
        let ds = KeyedDataset::with_keys(["x", "y", "z"], ["a", "b", "a"]).unwrap();
        let order: Vec<String> = ds.values().map(ToString::to_string).collect();
        assert_eq!(order, vec!["z", "y"]);
    }

    #[test]
    fn mismatched_key_length_is_a_config_error() {
        let err = KeyedDataset::with_keys([1.0, 2.0, 3.0], ["a", "b"]).unwrap_err();
        assert_eq!(err, ConfigError::KeyLengthMismatch { values: 3, keys: 2 });
    }

    #[test]
    fn nan_and_null_are_missing() {
        assert!(Value::from(f64::NAN).is_missing());
        assert!(Value::from(JsonValue::Null).is_missing());
        let ds = KeyedDataset::from_values([Value::from(1.0), Value::Missing, Value::from(3.0)]);
        assert_eq!(ds.without_missing().len(), 2);
        assert_eq!(ds.without_missing().numbers(), vec![1.0, 3.0]);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from("2.5").as_f64(), Some(2.5));
        assert_eq!(Value::from("apple").as_f64(), None);
        assert_eq!(Value::from(true).as_f64(), Some(1.0));
    }

    #[test]
    fn json_keys_and_values() {
        let keys: Vec<Key> = serde_json::from_str(r#"["a", 2, 3]"#).unwrap();
        assert_eq!(keys, vec![Key::from("a"), Key::from(2usize), Key::from("3")]);
        let values: Vec<Value> = serde_json::from_str(r#"[1.5, "b", null, true]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Number(1.5), Value::from("b"), Value::Missing, Value::Bool(true)]
        );
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
    }

    #[test]
    fn ordering_groups_by_kind() {
        let mut vals = vec![Value::from("b"), Value::Number(2.0), Value::from("a"), Value::Number(-1.0)];
        vals.sort();
        assert_eq!(
            vals,
            vec![Value::Number(-1.0), Value::Number(2.0), Value::from("a"), Value::from("b")]
        );
    }
}
