//! Crosstalk-aware summary widgets: keyed datasets, a statistic engine and
//! locale-aware formatting for gauges, value boxes and number/text spans.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod state;
pub mod stats;

pub use data::filter::{filter_by_keys, CrosstalkEvent, FilterSet};
pub use data::model::{Key, KeyedDataset, Value};
pub use error::{ConfigError, FormatError, SummaryError};
pub use state::{Widget, WidgetKind, WidgetOutput};
