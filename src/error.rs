use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration errors – structural problems with the widget payload
// ---------------------------------------------------------------------------

/// A malformed or inconsistent widget configuration.
///
/// These are fatal: the caller is expected to fix the payload, retrying with
/// the same input reproduces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown statistic '{0}'")]
    UnknownStatistic(String),

    #[error("statistic '{statistic}' is not supported by the {widget} widget")]
    UnsupportedStatistic {
        statistic: String,
        widget: &'static str,
    },

    #[error("unknown number format '{0}'")]
    UnknownNumberFormat(String),

    #[error("unknown sign display '{0}'")]
    UnknownSignDisplay(String),

    #[error("unknown notation '{0}'")]
    UnknownNotation(String),

    #[error("unknown sort order '{0}'")]
    UnknownSortOrder(String),

    #[error("quantile fraction {0} is outside [0, 1]")]
    QuantileOutOfRange(f64),

    #[error("{keys} keys supplied for {values} values")]
    KeyLengthMismatch { values: usize, keys: usize },

    #[error("weighted mean needs one weight per value: {primary} values, {weight} weights")]
    WeightLengthMismatch { primary: usize, weight: usize },

    #[error("threshold domain entry '{0}' is neither numeric nor an infinity sentinel")]
    InvalidThreshold(String),

    #[error("'{0}' is not a recognised colour")]
    InvalidColor(String),
}

// ---------------------------------------------------------------------------
// Formatting errors – surfaced by the number formatter
// ---------------------------------------------------------------------------

/// Errors raised while rendering a number for display.
///
/// The engine does not validate locale/currency/unit identifiers ahead of
/// time; they surface here the first time a non-`NA` value is formatted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid locale tag '{0}'")]
    InvalidLocale(String),

    #[error("currency style requires a currency code")]
    MissingCurrency,

    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("unit style requires a unit")]
    MissingUnit,

    #[error("unsupported unit '{0}'")]
    UnknownUnit(String),

    #[error("fraction digits {0} out of range (0-20)")]
    DigitsOutOfRange(u32),
}

/// Anything a statistic computation can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type Result<T, E = SummaryError> = std::result::Result<T, E>;
