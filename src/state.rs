use serde::Serialize;

use crate::color::{Color, ThresholdScale, ValueBoxColors, ValueBoxScales};
use crate::config::WidgetPayload;
use crate::data::filter::CrosstalkEvent;
use crate::data::model::KeyedDataset;
use crate::error::{ConfigError, Result};
use crate::stats::{
    compute_gauge, compute_text, compute_value, GaugeConfig, GaugeSummary, Statistic,
    StatisticConfig, SummaryResult, SummaryValue, TextConfig, TextStatistic, TextSummary,
};

// ---------------------------------------------------------------------------
// Widget kinds
// ---------------------------------------------------------------------------

/// The four summary widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WidgetKind {
    NumberSpan,
    ValueBox,
    Gauge,
    TextSpan,
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::NumberSpan => "number span",
            WidgetKind::ValueBox => "value box",
            WidgetKind::Gauge => "gauge",
            WidgetKind::TextSpan => "text span",
        }
    }
}

#[derive(Debug, Clone)]
enum Summarizer {
    Number(StatisticConfig),
    ValueBox {
        config: StatisticConfig,
        scales: ValueBoxScales,
        caption: Option<String>,
    },
    Gauge {
        config: GaugeConfig,
        scale: Option<ThresholdScale>,
    },
    Text(TextConfig),
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// What a widget shows after one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetOutput {
    NumberSpan(SummaryResult),
    ValueBox {
        #[serde(flatten)]
        summary: SummaryResult,
        colors: ValueBoxColors,
        caption: Option<String>,
    },
    Gauge {
        #[serde(flatten)]
        summary: GaugeSummary,
        fill: Option<Color>,
    },
    TextSpan { text: TextSummary },
}

impl WidgetOutput {
    /// The main string the widget displays.
    pub fn display_text(&self) -> String {
        match self {
            WidgetOutput::NumberSpan(r) | WidgetOutput::ValueBox { summary: r, .. } => {
                r.formatted.clone()
            }
            WidgetOutput::Gauge { summary, .. } => summary.formatted.clone(),
            WidgetOutput::TextSpan { text } => text.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Widget state
// ---------------------------------------------------------------------------

/// One widget: the unfiltered columns plus its typed configuration.
///
/// Every crosstalk event narrows the full datasets afresh; nothing carries
/// over from the previous event.
#[derive(Debug, Clone)]
pub struct Widget {
    summarizer: Summarizer,
    data: KeyedDataset,
    aux: Option<KeyedDataset>,
    group: Option<String>,
}

impl Widget {
    /// Build a widget from its payload. The runtime-locale sentinel is
    /// resolved here against `runtime_locale`.
    pub fn from_payload(
        payload: &WidgetPayload,
        kind: WidgetKind,
        runtime_locale: &str,
    ) -> Result<Self, ConfigError> {
        let settings = &payload.settings;
        let data = payload.primary()?;

        let (summarizer, aux) = match kind {
            WidgetKind::TextSpan => {
                let config = settings
                    .text_config(runtime_locale)
                    .map_err(|e| unsupported(e, kind))?;
                (Summarizer::Text(config), None)
            }
            _ => {
                let config = settings
                    .statistic_config(runtime_locale)
                    .map_err(|e| unsupported(e, kind))?;
                let aux = match config.statistic.aux_role() {
                    Some(role) => payload.auxiliary(role)?,
                    None => None,
                };
                let summarizer = match kind {
                    WidgetKind::ValueBox => Summarizer::ValueBox {
                        config,
                        scales: ValueBoxScales::from_raw(
                            payload.color_thresholds.as_ref(),
                            payload.color_text.as_ref(),
                            payload.color_icon.as_ref(),
                        )?,
                        caption: payload.caption.clone(),
                    },
                    WidgetKind::Gauge => Summarizer::Gauge {
                        config: GaugeConfig {
                            statistic: config,
                            min: payload.min,
                            max: payload.max,
                        },
                        scale: payload
                            .color_thresholds
                            .as_ref()
                            .map(ThresholdScale::from_raw)
                            .transpose()?,
                    },
                    _ => Summarizer::Number(config),
                };
                (summarizer, aux)
            }
        };

        log::info!("{} widget over {} rows", kind.name(), data.len());
        Ok(Self {
            summarizer,
            data,
            aux,
            group: settings.crosstalk_group.clone(),
        })
    }

    /// Crosstalk group the widget listens to.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Summary over the full, unfiltered data.
    pub fn render(&self) -> Result<WidgetOutput> {
        self.summarize(&self.data, self.aux.as_ref())
    }

    /// Summary after a filter or selection change. The auxiliary column is
    /// narrowed with the same keys as the primary one.
    pub fn handle(&self, event: &CrosstalkEvent) -> Result<WidgetOutput> {
        let data = event.apply(&self.data);
        let aux = self.aux.as_ref().map(|a| event.apply(a));
        self.summarize(&data, aux.as_ref())
    }

    fn summarize(&self, data: &KeyedDataset, aux: Option<&KeyedDataset>) -> Result<WidgetOutput> {
        let output = match &self.summarizer {
            Summarizer::Number(config) => WidgetOutput::NumberSpan(compute_value(data, aux, config)?),
            Summarizer::ValueBox {
                config,
                scales,
                caption,
            } => {
                let summary = compute_value(data, aux, config)?;
                WidgetOutput::ValueBox {
                    colors: scales.resolve(summary.value),
                    summary,
                    caption: caption.clone(),
                }
            }
            Summarizer::Gauge { config, scale } => {
                let summary = compute_gauge(data, aux, config)?;
                let position = match summary.value {
                    SummaryValue::Na => f64::NEG_INFINITY,
                    SummaryValue::Number(_) => summary.fraction,
                };
                WidgetOutput::Gauge {
                    fill: scale.as_ref().and_then(|s| s.color_for(position)),
                    summary,
                }
            }
            Summarizer::Text(config) => WidgetOutput::TextSpan {
                text: compute_text(data, config)?,
            },
        };
        Ok(output)
    }
}

/// Report a statistic that exists for the other widget family as unsupported
/// rather than unknown.
fn unsupported(err: ConfigError, kind: WidgetKind) -> ConfigError {
    match err {
        ConfigError::UnknownStatistic(statistic) => {
            let known_elsewhere = match kind {
                WidgetKind::TextSpan => Statistic::parse(&statistic, None).is_ok(),
                _ => TextStatistic::parse(&statistic, None).is_ok(),
            };
            if known_elsewhere {
                ConfigError::UnsupportedStatistic {
                    statistic,
                    widget: kind.name(),
                }
            } else {
                ConfigError::UnknownStatistic(statistic)
            }
        }
        other => other,
    }
}
