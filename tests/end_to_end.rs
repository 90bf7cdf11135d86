use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use crosstalk_summary::config::WidgetPayload;
use crosstalk_summary::data::filter::{filter_set, CrosstalkEvent, FilterSet};
use crosstalk_summary::data::loader::load_file;
use crosstalk_summary::format::{FormatOptions, NumberFormat};
use crosstalk_summary::stats::{
    compute_gauge, compute_value, GaugeConfig, Statistic, StatisticConfig, SummaryValue,
};
use crosstalk_summary::{
    ConfigError, Key, KeyedDataset, SummaryError, Value, Widget, WidgetKind, WidgetOutput,
};

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn write_parquet(dir: &Path, name: &str, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .expect("record batch");

    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("parquet writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
    path
}

#[test]
fn mean_with_one_decimal() {
    let ds = KeyedDataset::build(vec![10.0.into(), 20.0.into(), 30.0.into(), 40.0.into()], None)
        .unwrap();
    let config = StatisticConfig::new(
        Statistic::Mean,
        FormatOptions::new(NumberFormat::Decimal).locale("en-US").digits(1),
    );
    let result = compute_value(&ds, None, &config).unwrap();
    assert_eq!(result.value, SummaryValue::Number(25.0));
    assert_eq!(result.formatted, "25.0");
}

#[test]
fn median_by_quantile() {
    let ds = KeyedDataset::from_values([1.0, 2.0, 3.0, 4.0, 5.0]);
    let config = StatisticConfig::new(
        Statistic::parse("quantile", Some(0.5)).unwrap(),
        FormatOptions::default(),
    );
    assert_eq!(
        compute_value(&ds, None, &config).unwrap().value,
        SummaryValue::Number(3.0)
    );
}

#[test]
fn gauge_sum_bounds() {
    let ds = KeyedDataset::from_values([2.0, 3.0]);
    let config = GaugeConfig::new(StatisticConfig::new(
        Statistic::Sum,
        FormatOptions::new(NumberFormat::Decimal),
    ));
    let gauge = compute_gauge(&ds, None, &config).unwrap();
    assert_eq!(gauge.min, 4.0);
    assert_eq!(gauge.max, 6.0);
    assert_eq!(gauge.value, SummaryValue::Number(5.0));
    assert!(gauge.footnote.is_empty());
}

#[test]
fn weighted_mean_contract() {
    let values = KeyedDataset::from_values([2.0, 4.0]);
    let config = StatisticConfig::new(Statistic::WtMean, FormatOptions::default());

    let weights = KeyedDataset::from_values([1.0, 1.0]);
    assert_eq!(
        compute_value(&values, Some(&weights), &config).unwrap().value,
        SummaryValue::Number(3.0)
    );

    let short = KeyedDataset::from_values([1.0]);
    assert!(matches!(
        compute_value(&values, Some(&short), &config),
        Err(SummaryError::Config(ConfigError::WeightLengthMismatch { .. }))
    ));
}

#[test]
fn sum_ratio_with_zero_denominator_is_na() {
    let values = KeyedDataset::from_values([1.0, 2.0]);
    let column2 = KeyedDataset::from_values([0.0, 0.0]);
    let config = StatisticConfig::new(Statistic::SumRatio, FormatOptions::default());
    let result = compute_value(&values, Some(&column2), &config).unwrap();
    assert_eq!(result.value, SummaryValue::Na);
    assert_eq!(result.formatted, "NA");
}

#[test]
fn widget_replays_events_in_order() {
    let payload = WidgetPayload::from_json(
        r#"{
            "data": [100, 250, 50, null, 600],
            "numerator": [100, null, 50, null, null],
            "settings": {
                "statistic": "sum_pct_total",
                "number_format": "percent",
                "digits": 1,
                "locale": "fr-FR",
                "crosstalk_key": ["a", "b", "c", "d", "e"],
                "crosstalk_group": "shop"
            }
        }"#,
    )
    .unwrap();
    let widget = Widget::from_payload(&payload, WidgetKind::ValueBox, "en-US").unwrap();
    assert_eq!(widget.group(), Some("shop"));

    let events = [
        CrosstalkEvent::Selection(Some(filter_set(["a", "b"]))),
        CrosstalkEvent::Filter(Some(filter_set(["b", "e"]))),
        CrosstalkEvent::Filter(Some(FilterSet::new())),
        CrosstalkEvent::Selection(None),
    ];
    let shown: Vec<String> = events
        .iter()
        .map(|e| widget.handle(e).unwrap().display_text())
        .collect();

    assert_eq!(widget.render().unwrap().display_text(), "15,0\u{202f}%");
    assert_eq!(
        shown,
        vec!["28,6\u{202f}%", "0,0\u{202f}%", "NA", "15,0\u{202f}%"]
    );
}

#[test]
fn gauge_output_serialises_for_the_drawing_layer() {
    let payload = WidgetPayload::from_json(
        r#"{"data": [3, 9], "min": 0, "max": 10,
            "settings": {"statistic": "max", "number_format": "decimal"}}"#,
    )
    .unwrap();
    let widget = Widget::from_payload(&payload, WidgetKind::Gauge, "en-US").unwrap();
    let output = widget.render().unwrap();
    let json: serde_json::Value = serde_json::to_value(&output).unwrap();
    assert_eq!(json["widget"], "gauge");
    assert_eq!(json["formatted"], "9");
    assert_eq!(json["max_formatted"], "10");
    assert_eq!(json["fraction"], 0.9);
    assert_eq!(json["footnote"], "");

    let na = widget
        .handle(&CrosstalkEvent::Filter(Some(FilterSet::new())))
        .unwrap();
    assert!(matches!(na, WidgetOutput::Gauge { ref summary, .. } if summary.value.is_na()));
    assert_eq!(serde_json::to_value(&na).unwrap()["value"], "NA");
}

#[test]
fn loads_csv_columns() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        tmp.path(),
        "orders.csv",
        "key,value,weight,region\n\
         a,10,1,north\n\
         b,NA,5,south\n\
         c,30,3,north\n",
    );
    let mut payload = load_file(&path).unwrap();

    payload.settings.statistic = Some("wt_mean".into());
    payload.settings.number_format = Some("decimal".into());
    payload.settings.digits = Some(1);
    let widget = Widget::from_payload(&payload, WidgetKind::NumberSpan, "en-US").unwrap();
    // The missing value drops row b, leaving two values against three weights.
    assert!(widget.render().is_err());

    let selected = widget
        .handle(&CrosstalkEvent::Selection(Some(filter_set(["a", "c"]))))
        .unwrap();
    assert_eq!(selected.display_text(), "25.0");
}

#[test]
fn loads_json_payload() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        tmp.path(),
        "payload.json",
        r#"{"data": ["red", "blue", "red"], "settings": {"statistic": "mode"}}"#,
    );
    let payload = load_file(&path).unwrap();

    let widget = Widget::from_payload(&payload, WidgetKind::TextSpan, "en-US").unwrap();
    assert_eq!(widget.render().unwrap().display_text(), "red");
}

#[test]
fn loader_reports_missing_value_column() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(tmp.path(), "no-value.csv", "key,weight\na,1\n");
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing 'value' column"));
}

#[test]
fn loads_parquet_columns() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_parquet(
        tmp.path(),
        "orders.parquet",
        vec![
            ("key", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
            ("value", Arc::new(Float64Array::from(vec![Some(10.0), None, Some(30.0)])) as ArrayRef),
            ("weight", Arc::new(Float32Array::from(vec![1.0f32, 5.0, 3.0])) as ArrayRef),
            ("region", Arc::new(StringArray::from(vec!["north", "south", "north"])) as ArrayRef),
        ],
    );
    let mut payload = load_file(&path).unwrap();
    assert_eq!(
        payload.data.0,
        vec![Value::Number(10.0), Value::Missing, Value::Number(30.0)]
    );
    assert_eq!(
        payload.settings.keys(),
        Some(vec![Key::from("1"), Key::from("2"), Key::from("3")])
    );

    payload.settings.statistic = Some("wt_mean".into());
    payload.settings.number_format = Some("decimal".into());
    payload.settings.digits = Some(1);
    let widget = Widget::from_payload(&payload, WidgetKind::NumberSpan, "en-US").unwrap();
    let selected = widget
        .handle(&CrosstalkEvent::Selection(Some(filter_set(["1", "3"]))))
        .unwrap();
    assert_eq!(selected.display_text(), "25.0");
}

#[test]
fn parquet_key_column_with_nulls_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_parquet(
        tmp.path(),
        "keyless.parquet",
        vec![
            ("key", Arc::new(Int64Array::from(vec![Some(1), None, None])) as ArrayRef),
            ("value", Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])) as ArrayRef),
        ],
    );
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("'key' column has no value in row 1"));
}
