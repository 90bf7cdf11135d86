use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, BooleanArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Key, Value};
use crate::config::{Column, OneOrMany, WidgetPayload};

/// Columns a tabular widget file may carry besides `value`.
const KEY_COLUMN: &str = "key";
const VALUE_COLUMN: &str = "value";
const AUX_COLUMNS: [&str; 3] = ["numerator", "column2", "weight"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a widget payload from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – a complete widget payload (`data`, `settings`, ...)
/// * `.csv`     – header row with a `value` column and optional `key`,
///   `numerator`, `column2` and `weight` columns
/// * `.parquet` – same columns as the CSV layout
///
/// Tabular files only provide data; their settings are the defaults.
pub fn load_file(path: &Path) -> Result<WidgetPayload> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let payload = match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!("loaded {} rows from {}", payload.data.0.len(), path.display());
    Ok(payload)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<WidgetPayload> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    WidgetPayload::from_json(&text).context("parsing widget payload")
}

// ---------------------------------------------------------------------------
// Tabular loaders
// ---------------------------------------------------------------------------

/// Named columns read from a CSV or Parquet file.
#[derive(Default)]
struct Table {
    columns: Vec<(String, Vec<Value>)>,
}

impl Table {
    fn column_mut(&mut self, name: &str) -> &mut Vec<Value> {
        let idx = match self.columns.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.columns.push((name.to_string(), Vec::new()));
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx].1
    }

    fn take(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    fn into_payload(mut self) -> Result<WidgetPayload> {
        let data = self
            .take(VALUE_COLUMN)
            .with_context(|| format!("missing '{VALUE_COLUMN}' column"))?;

        let mut payload = WidgetPayload {
            data: Column(data),
            ..WidgetPayload::default()
        };
        payload.numerator = self.take(AUX_COLUMNS[0]).map(Column);
        payload.column2 = self.take(AUX_COLUMNS[1]).map(Column);
        payload.weight = self.take(AUX_COLUMNS[2]).map(Column);
        if let Some(keys) = self.take(KEY_COLUMN) {
            if let Some(row) = keys.iter().position(Value::is_missing) {
                bail!("'{KEY_COLUMN}' column has no value in row {row}");
            }
            let keys = keys.into_iter().map(|k| Key::from(k.to_string())).collect();
            payload.settings.crosstalk_key = Some(OneOrMany::Many(keys));
        }

        for (name, _) in &self.columns {
            log::debug!("ignoring column '{name}'");
        }
        Ok(payload)
    }
}

fn load_csv(path: &Path) -> Result<WidgetPayload> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::default();
    for name in &headers {
        table.column_mut(name);
    }

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (name, cell) in headers.iter().zip(record.iter()) {
            // Keys stay textual so "007" does not collapse to 7.
            let value = if name == KEY_COLUMN {
                if cell.trim().is_empty() {
                    Value::Missing
                } else {
                    Value::Text(cell.to_string())
                }
            } else {
                guess_value(cell)
            };
            table.column_mut(name).push(value);
        }
    }

    table.into_payload()
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() || s == "NA" {
        return Value::Missing;
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::from(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::Text(s.to_string())
}

/// Load a Parquet file with the tabular widget layout.
///
/// Value columns may be floats, integers, booleans or strings; nulls become
/// missing cells.
fn load_parquet(path: &Path) -> Result<WidgetPayload> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::default();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (idx, field) in schema.fields().iter().enumerate() {
            let col = batch.column(idx);
            let values = (0..batch.num_rows())
                .map(|row| extract_value(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("column '{}'", field.name()))?;
            table.column_mut(field.name()).extend(values);
        }
    }

    table.into_payload()
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Missing);
    }
    let value = match col.data_type() {
        DataType::Float64 => Value::from(primitive::<Float64Type>(col)?.value(row)),
        DataType::Float32 => Value::from(f64::from(primitive::<Float32Type>(col)?.value(row))),
        DataType::Int64 => Value::from(primitive::<Int64Type>(col)?.value(row)),
        DataType::Int32 => Value::from(i64::from(primitive::<Int32Type>(col)?.value(row))),
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            Value::Bool(arr.value(row))
        }
        DataType::Utf8 => Value::from(
            col.as_string_opt::<i32>()
                .context("expected StringArray")?
                .value(row),
        ),
        DataType::LargeUtf8 => Value::from(
            col.as_string_opt::<i64>()
                .context("expected LargeStringArray")?
                .value(row),
        ),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

fn primitive<T: arrow::datatypes::ArrowPrimitiveType>(
    col: &Arc<dyn Array>,
) -> Result<&arrow::array::PrimitiveArray<T>> {
    col.as_primitive_opt::<T>()
        .with_context(|| format!("expected {:?} array", T::DATA_TYPE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_cell_types() {
        assert_eq!(guess_value(""), Value::Missing);
        assert_eq!(guess_value("NA"), Value::Missing);
        assert_eq!(guess_value(" 2.5 "), Value::Number(2.5));
        assert_eq!(guess_value("true"), Value::Bool(true));
        assert_eq!(guess_value("north"), Value::from("north"));
    }

    #[test]
    fn table_requires_value_column() {
        let mut table = Table::default();
        table.column_mut("key").push(Value::from("a"));
        assert!(table.into_payload().is_err());
    }

    #[test]
    fn table_maps_named_columns() {
        let mut table = Table::default();
        table.column_mut("value").extend([Value::from(1.0), Value::from(2.0)]);
        table.column_mut("weight").extend([Value::from(3.0), Value::from(4.0)]);
        table.column_mut("key").extend([Value::from("x"), Value::from("y")]);
        table.column_mut("region").extend([Value::from("n"), Value::from("s")]);

        let payload = table.into_payload().unwrap();
        assert_eq!(payload.data.0.len(), 2);
        assert!(payload.weight.is_some());
        assert!(payload.numerator.is_none());
        assert_eq!(
            payload.settings.keys(),
            Some(vec![Key::from("x"), Key::from("y")])
        );
    }

    #[test]
    fn table_rejects_missing_keys() {
        let mut table = Table::default();
        table.column_mut("value").extend([Value::from(1.0), Value::from(2.0), Value::from(3.0)]);
        table.column_mut("key").extend([Value::from("a"), Value::Missing, Value::Missing]);

        let err = table.into_payload().unwrap_err();
        assert_eq!(err.to_string(), "'key' column has no value in row 1");
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = load_file(Path::new("widget.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }
}
