use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::config::RawThresholds;
use crate::error::ConfigError;
use crate::stats::SummaryValue;

const NEG_INFINITY: &str = "Number.NEGATIVE_INFINITY";
const POS_INFINITY: &str = "Number.POSITIVE_INFINITY";

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An opaque sRGB colour, displayed as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(Srgb<u8>);

impl Color {
    pub const BLACK: Color = Color(Srgb::new(0, 0, 0));
    pub const WHITE: Color = Color(Srgb::new(255, 255, 255));

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(Srgb::new(red, green, blue))
    }

    /// Parse a hex colour (`#1f77b4`, `#fff`) or a CSS colour name.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let s = s.trim();
        if s.starts_with('#') {
            return Srgb::<u8>::from_str(s)
                .map(Color)
                .map_err(|_| ConfigError::InvalidColor(s.to_string()));
        }
        palette::named::from_str(&s.to_ascii_lowercase())
            .map(Color)
            .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
    }

    /// Black or white, whichever reads better on top of this colour.
    pub fn contrasting_text(&self) -> Color {
        let luma = 0.299 * f64::from(self.0.red)
            + 0.587 * f64::from(self.0.green)
            + 0.114 * f64::from(self.0.blue);
        if luma > 186.0 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Threshold scale: value → colour by bucket
// ---------------------------------------------------------------------------

/// Maps a number to `range[i]`, where `i` is how many domain thresholds are
/// at or below it. `n` thresholds split the line into `n + 1` buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdScale {
    domain: Vec<f64>,
    range: Vec<Color>,
}

impl ThresholdScale {
    pub fn new(domain: Vec<f64>, range: Vec<Color>) -> Self {
        Self { domain, range }
    }

    pub fn from_raw(raw: &RawThresholds) -> Result<Self, ConfigError> {
        let domain = raw
            .domain
            .clone()
            .into_vec()
            .iter()
            .map(threshold)
            .collect::<Result<Vec<_>, _>>()?;
        let range = raw
            .range
            .clone()
            .into_vec()
            .iter()
            .map(|c| Color::parse(c))
            .collect::<Result<Vec<_>, _>>()?;
        if range.len() != domain.len() + 1 {
            log::warn!(
                "threshold scale has {} thresholds but {} colours",
                domain.len(),
                range.len()
            );
        }
        Ok(Self::new(domain, range))
    }

    /// Colour for `x`; `None` for NaN or when the range runs out.
    pub fn color_for(&self, x: f64) -> Option<Color> {
        if x.is_nan() {
            return None;
        }
        let bucket = self.domain.partition_point(|t| *t <= x);
        self.range.get(bucket).copied()
    }
}

/// One domain entry: a number, a numeric string or an infinity sentinel.
fn threshold(entry: &JsonValue) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidThreshold(entry.to_string());
    match entry {
        JsonValue::Number(n) => n.as_f64().ok_or_else(invalid),
        JsonValue::String(s) => match s.as_str() {
            NEG_INFINITY => Ok(f64::NEG_INFINITY),
            POS_INFINITY => Ok(f64::INFINITY),
            other => other
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| !v.is_nan())
                .ok_or_else(invalid),
        },
        _ => Err(invalid()),
    }
}

// ---------------------------------------------------------------------------
// Value box colours
// ---------------------------------------------------------------------------

/// Colours of a value box for one summary value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueBoxColors {
    pub background: Option<Color>,
    pub text: Option<Color>,
    pub icon: Option<Color>,
}

/// Background, text and icon scales of a value box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBoxScales {
    pub background: Option<ThresholdScale>,
    pub text: Option<ThresholdScale>,
    pub icon: Option<ThresholdScale>,
}

impl ValueBoxScales {
    pub fn from_raw(
        background: Option<&RawThresholds>,
        text: Option<&RawThresholds>,
        icon: Option<&RawThresholds>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            background: background.map(ThresholdScale::from_raw).transpose()?,
            text: text.map(ThresholdScale::from_raw).transpose()?,
            icon: icon.map(ThresholdScale::from_raw).transpose()?,
        })
    }

    /// Resolve the colours for `value`. `NA` has no colour. Without a text
    /// scale the text takes the contrast colour of the background.
    pub fn resolve(&self, value: SummaryValue) -> ValueBoxColors {
        let Some(v) = value.as_f64() else {
            return ValueBoxColors {
                background: None,
                text: None,
                icon: None,
            };
        };
        let lookup = |scale: &Option<ThresholdScale>| scale.as_ref().and_then(|s| s.color_for(v));

        let background = lookup(&self.background);
        let text = match &self.text {
            Some(scale) => scale.color_for(v),
            None => background.map(|bg| bg.contrasting_text()),
        };
        ValueBoxColors {
            background,
            text,
            icon: lookup(&self.icon),
        }
    }
}
