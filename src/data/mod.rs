/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → WidgetPayload (columns + settings)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ KeyedDataset │  row key → Value, insertion ordered
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  crosstalk filter / selection → narrowed KeyedDataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
