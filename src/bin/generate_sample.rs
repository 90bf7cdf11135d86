use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Float64Builder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One order line of the sample sales table.
struct Row {
    key: String,
    region: &'static str,
    revenue: f64,
    /// Revenue of promoted orders, missing otherwise.
    promoted: Option<f64>,
    cost: f64,
    units: f64,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let regions = [("North", 120.0), ("South", 90.0), ("East", 150.0), ("West", 60.0)];
    let mut rows = Vec::new();

    for (region, base) in regions {
        for i in 0..25 {
            let units = (rng.next_f64() * 20.0).floor() + 1.0;
            let revenue = round2((base + rng.gauss(0.0, base * 0.2)).max(1.0) * units);
            let cost = round2(revenue * (0.55 + rng.next_f64() * 0.3));
            let promoted = (rng.next_f64() < 0.3).then_some(revenue);
            rows.push(Row {
                key: format!("{}-{i:02}", region.to_ascii_lowercase()),
                region,
                revenue,
                promoted,
                cost,
                units,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["key", "region", "value", "numerator", "column2", "weight"])?;
    for row in rows {
        writer.write_record([
            row.key.clone(),
            row.region.to_string(),
            row.revenue.to_string(),
            row.promoted.map_or_else(|| "NA".to_string(), |p| p.to_string()),
            row.cost.to_string(),
            row.units.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let mut promoted = Float64Builder::new();
    for row in rows {
        promoted.append_option(row.promoted);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
        Field::new("numerator", DataType::Float64, true),
        Field::new("column2", DataType::Float64, false),
        Field::new("weight", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.key.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.revenue))),
        Arc::new(promoted.finish()),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.cost))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.units))),
    ];
    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// A value box payload over the same rows, coloured by average order revenue.
fn write_payload(rows: &[Row], path: &str) -> Result<()> {
    let payload = json!({
        "data": rows.iter().map(|r| r.revenue).collect::<Vec<_>>(),
        "numerator": rows.iter().map(|r| r.promoted).collect::<Vec<_>>(),
        "column2": rows.iter().map(|r| r.cost).collect::<Vec<_>>(),
        "weight": rows.iter().map(|r| r.units).collect::<Vec<_>>(),
        "caption": "Average order revenue",
        "color_thresholds": {
            "domain": ["Number.NEGATIVE_INFINITY", 1000, 2000],
            "range": ["#cccccc", "#d62728", "#ff7f0e", "#2ca02c"]
        },
        "settings": {
            "statistic": "mean",
            "number_format": "currency",
            "currency": "USD",
            "locale": "navigator.language",
            "digits": 0,
            "crosstalk_key": rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
            "crosstalk_group": "sales"
        }
    });
    let text = serde_json::to_string_pretty(&payload).context("serialising payload")?;
    std::fs::write(path, text).context("writing payload")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_data.csv")?;
    write_parquet(&rows, "sample_data.parquet")?;
    write_payload(&rows, "sample_widget.json")?;

    log::info!("generated {} rows", rows.len());
    println!(
        "Wrote {} order lines to sample_data.csv, sample_data.parquet and sample_widget.json",
        rows.len()
    );
    Ok(())
}
