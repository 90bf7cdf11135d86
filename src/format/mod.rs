//! Locale-aware number formatting.
//!
//! Mirrors the options a browser number formatter exposes for the widgets:
//! decimal / percent / currency / unit styles, a fixed number of fraction
//! digits (default 0), sign display and standard / compact notation.

pub mod locale;

use std::str::FromStr;

use crate::data::model::plain_number;
use crate::error::{ConfigError, FormatError};

use self::locale::{resolve_locale, CurrencyPattern, NumberLocale, PercentPattern};

const NBSP: char = '\u{a0}';
const MAX_DIGITS: u32 = 20;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Display style for a summary value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// No locale formatting; the plain number.
    #[default]
    None,
    Decimal,
    Percent,
    Currency { code: Option<String> },
    Unit { unit: Option<String> },
}

impl NumberFormat {
    /// Parse a `number_format` setting, attaching the currency code or unit
    /// the style needs. Missing codes are only reported when formatting.
    pub fn parse(
        name: &str,
        currency: Option<&str>,
        unit: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match name {
            "none" | "" => Ok(NumberFormat::None),
            "decimal" => Ok(NumberFormat::Decimal),
            "percent" => Ok(NumberFormat::Percent),
            "currency" => Ok(NumberFormat::Currency {
                code: currency.map(str::to_string),
            }),
            "unit" => Ok(NumberFormat::Unit {
                unit: unit.map(str::to_string),
            }),
            other => Err(ConfigError::UnknownNumberFormat(other.to_string())),
        }
    }
}

/// When to show a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignDisplay {
    /// Negative numbers only.
    #[default]
    Auto,
    Always,
    ExceptZero,
    Never,
}

impl FromStr for SignDisplay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(SignDisplay::Auto),
            "always" => Ok(SignDisplay::Always),
            "exceptZero" => Ok(SignDisplay::ExceptZero),
            "never" => Ok(SignDisplay::Never),
            other => Err(ConfigError::UnknownSignDisplay(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    #[default]
    Standard,
    Compact,
}

impl FromStr for Notation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Notation::Standard),
            "compact" => Ok(Notation::Compact),
            other => Err(ConfigError::UnknownNotation(other.to_string())),
        }
    }
}

/// Everything the formatter needs to render one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub style: NumberFormat,
    /// Resolved BCP-47 tag.
    pub locale: String,
    pub digits: Option<u32>,
    pub sign_display: SignDisplay,
    pub notation: Notation,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            style: NumberFormat::None,
            locale: "en-US".to_string(),
            digits: None,
            sign_display: SignDisplay::Auto,
            notation: Notation::Standard,
        }
    }
}

impl FormatOptions {
    pub fn new(style: NumberFormat) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn digits(mut self, digits: u32) -> Self {
        self.digits = Some(digits);
        self
    }

    pub fn sign_display(mut self, sign_display: SignDisplay) -> Self {
        self.sign_display = sign_display;
        self
    }

    pub fn notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// Same options rendered as a plain decimal, used for counts.
    pub fn as_decimal(&self) -> Self {
        Self {
            style: NumberFormat::Decimal,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Style {
    Plain,
    Decimal,
    Percent,
    Currency(String),
    Unit(UnitLabel),
}

/// A validated formatter for one set of [`FormatOptions`].
#[derive(Debug, Clone)]
pub struct NumberFormatter {
    locale: &'static NumberLocale,
    style: Style,
    digits: usize,
    sign_display: SignDisplay,
    compact: bool,
}

impl NumberFormatter {
    /// Validate the locale, currency code, unit and digit count.
    pub fn new(options: &FormatOptions) -> Result<Self, FormatError> {
        let digits = options.digits.unwrap_or(0);
        if digits > MAX_DIGITS {
            return Err(FormatError::DigitsOutOfRange(digits));
        }

        let style = match &options.style {
            NumberFormat::None => Style::Plain,
            NumberFormat::Decimal => Style::Decimal,
            NumberFormat::Percent => Style::Percent,
            NumberFormat::Currency { code } => {
                let code = code.as_deref().ok_or(FormatError::MissingCurrency)?;
                Style::Currency(currency_symbol(code)?)
            }
            NumberFormat::Unit { unit } => {
                let unit = unit.as_deref().ok_or(FormatError::MissingUnit)?;
                Style::Unit(unit_label(unit)?)
            }
        };

        Ok(Self {
            locale: resolve_locale(&options.locale)?,
            style,
            digits: digits as usize,
            sign_display: options.sign_display,
            compact: options.notation == Notation::Compact
                && matches!(options.style, NumberFormat::Decimal | NumberFormat::Unit { .. }),
        })
    }

    pub fn format(&self, value: f64) -> String {
        if let Style::Plain = self.style {
            return plain_number(value);
        }
        if value.is_nan() {
            return "NaN".to_string();
        }

        let scaled = match self.style {
            Style::Percent => value * 100.0,
            _ => value,
        };
        let negative = scaled < 0.0;
        let (body, is_zero) = self.body(scaled.abs());

        let sign = match self.sign_display {
            SignDisplay::Never => "",
            SignDisplay::ExceptZero if is_zero => "",
            _ if negative => "-",
            SignDisplay::Always | SignDisplay::ExceptZero => "+",
            SignDisplay::Auto => "",
        };

        match &self.style {
            Style::Plain | Style::Decimal => format!("{sign}{body}"),
            Style::Percent => match self.locale.percent {
                PercentPattern::Attached => format!("{sign}{body}%"),
                PercentPattern::Spaced(sep) => format!("{sign}{body}{sep}%"),
            },
            Style::Currency(symbol) => match self.locale.currency {
                CurrencyPattern::Prefix => format!("{sign}{symbol}{body}"),
                CurrencyPattern::PrefixSpaced => format!("{symbol}{NBSP}{sign}{body}"),
                CurrencyPattern::Suffix => format!("{sign}{body}{NBSP}{symbol}"),
            },
            Style::Unit(label) => {
                let symbol = if is_one(&body) { &label.one } else { &label.other };
                if label.spaced {
                    format!("{sign}{body} {symbol}")
                } else {
                    format!("{sign}{body}{symbol}")
                }
            }
        }
    }

    /// Digits of `abs` with grouping, decimal separator and compact suffix,
    /// plus whether the rounded magnitude is zero.
    fn body(&self, abs: f64) -> (String, bool) {
        if abs.is_infinite() {
            return ("∞".to_string(), false);
        }
        let (rounded, suffix) = if self.compact {
            self.compact_parts(abs)
        } else {
            (round_to(abs, self.digits), "")
        };

        let fixed = format!("{:.*}", self.digits, rounded);
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
        let grouped = group_digits(
            int_part,
            self.locale.group_separator,
            self.locale.min_grouping_digits,
        );

        let body = if frac_part.is_empty() {
            format!("{grouped}{suffix}")
        } else {
            format!("{grouped}{}{frac_part}{suffix}", self.locale.decimal_separator)
        };
        (body, rounded == 0.0)
    }

    /// Pick the compact tier for `abs`, promoting to the next tier when
    /// rounding reaches it (`999_999` → `1M`, not `1000K`).
    fn compact_parts(&self, abs: f64) -> (f64, &'static str) {
        let tiers = self.locale.compact;
        let mut idx = tiers.iter().rposition(|(exp, _)| abs >= 10f64.powi(*exp));
        loop {
            let divisor = idx.map_or(1.0, |i| 10f64.powi(tiers[i].0));
            let rounded = round_to(abs / divisor, self.digits);
            let next = idx.map_or(0, |i| i + 1);
            if next < tiers.len() && rounded * divisor >= 10f64.powi(tiers[next].0) {
                idx = Some(next);
                continue;
            }
            return (rounded, idx.map_or("", |i| tiers[i].1));
        }
    }
}

/// Format `value` with `options`.
pub fn format_number(value: f64, options: &FormatOptions) -> Result<String, FormatError> {
    Ok(NumberFormatter::new(options)?.format(value))
}

/// Round half away from zero to `digits` fraction digits.
fn round_to(x: f64, digits: usize) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}

fn group_digits(int_part: &str, sep: char, min_grouping: usize) -> String {
    let len = int_part.len();
    if len < 3 + min_grouping {
        return int_part.to_string();
    }

    let mut out = String::with_capacity(len + len / 3 * sep.len_utf8());
    let mut first_group = len % 3;
    if first_group == 0 {
        first_group = 3;
    }

    out.push_str(&int_part[..first_group]);
    let mut idx = first_group;
    while idx < len {
        out.push(sep);
        out.push_str(&int_part[idx..idx + 3]);
        idx += 3;
    }
    out
}

fn is_one(body: &str) -> bool {
    body == "1"
}

// ---------------------------------------------------------------------------
// Currency and unit tables
// ---------------------------------------------------------------------------

/// Narrow currency symbol; codes without a narrow symbol render as the code.
fn currency_symbol(code: &str) -> Result<String, FormatError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::InvalidCurrency(code.to_string()));
    }
    let code = code.to_ascii_uppercase();
    let symbol = match code.as_str() {
        "USD" | "CAD" | "AUD" | "NZD" | "MXN" | "HKD" | "SGD" | "ARS" | "CLP" | "COP" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "BRL" => "R$",
        "RUB" => "₽",
        "ILS" => "₪",
        "NGN" => "₦",
        "PHP" => "₱",
        "TRY" => "₺",
        "UAH" => "₴",
        "VND" => "₫",
        "PLN" => "zł",
        "SEK" | "NOK" | "DKK" => "kr",
        _ => return Ok(code),
    };
    Ok(symbol.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UnitLabel {
    one: String,
    other: String,
    spaced: bool,
}

impl UnitLabel {
    fn spaced(symbol: &str) -> Self {
        Self::plural(symbol, symbol)
    }

    fn attached(symbol: &str) -> Self {
        Self {
            spaced: false,
            ..Self::spaced(symbol)
        }
    }

    fn plural(one: &str, other: &str) -> Self {
        Self {
            one: one.to_string(),
            other: other.to_string(),
            spaced: true,
        }
    }
}

fn simple_unit(unit: &str) -> Option<UnitLabel> {
    use UnitLabel as L;
    let label = match unit {
        "percent" => L::attached("%"),
        "celsius" => L::attached("°C"),
        "fahrenheit" => L::attached("°F"),
        "degree" => L::spaced("deg"),
        "millimeter" => L::spaced("mm"),
        "centimeter" => L::spaced("cm"),
        "meter" => L::spaced("m"),
        "kilometer" => L::spaced("km"),
        "inch" => L::spaced("in"),
        "foot" => L::spaced("ft"),
        "yard" => L::spaced("yd"),
        "mile" => L::spaced("mi"),
        "acre" => L::spaced("ac"),
        "hectare" => L::spaced("ha"),
        "gram" => L::spaced("g"),
        "kilogram" => L::spaced("kg"),
        "ounce" => L::spaced("oz"),
        "pound" => L::spaced("lb"),
        "stone" => L::spaced("st"),
        "milliliter" => L::spaced("mL"),
        "liter" => L::spaced("L"),
        "fluid-ounce" => L::spaced("fl oz"),
        "gallon" => L::spaced("gal"),
        "bit" => L::spaced("bit"),
        "byte" => L::spaced("byte"),
        "kilobit" => L::spaced("kb"),
        "kilobyte" => L::spaced("kB"),
        "megabit" => L::spaced("Mb"),
        "megabyte" => L::spaced("MB"),
        "gigabit" => L::spaced("Gb"),
        "gigabyte" => L::spaced("GB"),
        "terabit" => L::spaced("Tb"),
        "terabyte" => L::spaced("TB"),
        "petabyte" => L::spaced("PB"),
        "millisecond" => L::spaced("ms"),
        "microsecond" => L::spaced("μs"),
        "nanosecond" => L::spaced("ns"),
        "second" => L::spaced("sec"),
        "minute" => L::spaced("min"),
        "hour" => L::spaced("hr"),
        "day" => L::plural("day", "days"),
        "week" => L::plural("wk", "wks"),
        "month" => L::plural("mth", "mths"),
        "year" => L::plural("yr", "yrs"),
        _ => return None,
    };
    Some(label)
}

/// Short label for a sanctioned unit or an `x-per-y` compound of two.
fn unit_label(unit: &str) -> Result<UnitLabel, FormatError> {
    match unit {
        "mile-per-hour" => return Ok(UnitLabel::spaced("mph")),
        "mile-per-gallon" => return Ok(UnitLabel::spaced("mpg")),
        _ => {}
    }
    if let Some(label) = simple_unit(unit) {
        return Ok(label);
    }
    if let Some((num, den)) = unit.split_once("-per-") {
        if let (Some(n), Some(d)) = (simple_unit(num), simple_unit(den)) {
            let per = match den {
                "hour" => "h",
                "second" => "s",
                _ => d.one.as_str(),
            };
            return Ok(UnitLabel::spaced(&format!("{}/{per}", n.other)));
        }
    }
    Err(FormatError::UnknownUnit(unit.to_string()))
}
