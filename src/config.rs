//! Widget payload and settings.
//!
//! The payload is the JSON object a document host serialises for one widget.
//! Raw settings are converted once into the typed configs the engine uses;
//! the runtime-locale sentinel is resolved at that point.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::data::model::{Key, KeyedDataset, Value};
use crate::error::ConfigError;
use crate::format::{FormatOptions, NumberFormat};
use crate::stats::{AuxRole, SortOrder, Statistic, StatisticConfig, TextConfig, TextStatistic};

/// Locale value meaning "use the runtime default locale".
pub const RUNTIME_LOCALE: &str = "navigator.language";

const FALLBACK_LOCALE: &str = "en-US";
const DEFAULT_STATISTIC: &str = "count";

/// A field that may hold a scalar or an array; a scalar is a length-1 array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(v) => vec![v],
        }
    }
}

/// One data column of the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "OneOrMany<Value>")]
pub struct Column(pub Vec<Value>);

impl From<OneOrMany<Value>> for Column {
    fn from(v: OneOrMany<Value>) -> Self {
        Column(v.into_vec())
    }
}

impl From<Vec<Value>> for Column {
    fn from(v: Vec<Value>) -> Self {
        Column(v)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Raw `settings` object of a widget payload. Absent and `null` fields are
/// both unset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub statistic: Option<String>,
    pub number_format: Option<String>,
    pub locale: Option<String>,
    pub digits: Option<u32>,
    #[serde(rename = "signDisplay")]
    pub sign_display: Option<String>,
    pub currency: Option<String>,
    pub unit: Option<String>,
    pub notation: Option<String>,
    pub quantile: Option<f64>,
    pub sort: Option<String>,
    #[serde(alias = "delimiter")]
    pub delim: Option<String>,
    pub crosstalk_key: Option<OneOrMany<Key>>,
    pub crosstalk_group: Option<String>,
}

impl Settings {
    /// Statistic name, `count` when unset.
    pub fn statistic(&self) -> &str {
        self.statistic.as_deref().unwrap_or(DEFAULT_STATISTIC)
    }

    /// The locale to format with, substituting `runtime_default` for the
    /// runtime-locale sentinel. Unset means en-US.
    pub fn resolve_locale(&self, runtime_default: &str) -> String {
        match self.locale.as_deref() {
            Some(RUNTIME_LOCALE) => runtime_default.to_string(),
            Some(locale) => locale.to_string(),
            None => FALLBACK_LOCALE.to_string(),
        }
    }

    pub fn format_options(&self, runtime_default: &str) -> Result<FormatOptions, ConfigError> {
        let style = match self.number_format.as_deref() {
            Some(name) => {
                NumberFormat::parse(name, self.currency.as_deref(), self.unit.as_deref())?
            }
            None => NumberFormat::None,
        };

        let mut options = FormatOptions::new(style).locale(self.resolve_locale(runtime_default));
        options.digits = self.digits;
        if let Some(sign) = &self.sign_display {
            options.sign_display = sign.parse()?;
        }
        if let Some(notation) = &self.notation {
            options.notation = notation.parse()?;
        }
        Ok(options)
    }

    pub fn statistic_config(&self, runtime_default: &str) -> Result<StatisticConfig, ConfigError> {
        Ok(StatisticConfig::new(
            Statistic::parse(self.statistic(), self.quantile)?,
            self.format_options(runtime_default)?,
        ))
    }

    pub fn text_config(&self, runtime_default: &str) -> Result<TextConfig, ConfigError> {
        let mut config = TextConfig::new(TextStatistic::parse(
            self.statistic(),
            self.delim.as_deref(),
        )?);
        if let Some(sort) = &self.sort {
            config.sort = sort.parse::<SortOrder>()?;
        }
        config.format = self.format_options(runtime_default)?;
        Ok(config)
    }

    /// Row keys shared by every column, if the widget is keyed.
    pub fn keys(&self) -> Option<Vec<Key>> {
        self.crosstalk_key.clone().map(OneOrMany::into_vec)
    }
}

/// Default locale of the running process: `LC_ALL`, then `LC_NUMERIC`, then
/// `LANG`, ignoring empty values.
pub fn runtime_default_locale() -> String {
    ["LC_ALL", "LC_NUMERIC", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Threshold colour scale as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawThresholds {
    pub domain: OneOrMany<JsonValue>,
    pub range: OneOrMany<String>,
}

/// A complete widget payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetPayload {
    pub data: Column,
    pub numerator: Option<Column>,
    pub column2: Option<Column>,
    pub weight: Option<Column>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub color_thresholds: Option<RawThresholds>,
    pub color_text: Option<RawThresholds>,
    pub color_icon: Option<RawThresholds>,
    pub caption: Option<String>,
    pub settings: Settings,
}

impl WidgetPayload {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The primary column keyed by the crosstalk keys.
    pub fn primary(&self) -> Result<KeyedDataset, ConfigError> {
        KeyedDataset::build(self.data.0.clone(), self.settings.keys())
    }

    /// The auxiliary column for `role`, keyed like the primary column; `None`
    /// when the payload does not carry it.
    pub fn auxiliary(&self, role: AuxRole) -> Result<Option<KeyedDataset>, ConfigError> {
        let column = match role {
            AuxRole::Numerator => &self.numerator,
            AuxRole::Column2 => &self.column2,
            AuxRole::Weight => &self.weight,
        };
        column
            .as_ref()
            .map(|c| KeyedDataset::build(c.0.clone(), self.settings.keys()))
            .transpose()
    }
}
