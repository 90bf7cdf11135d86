use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crosstalk_summary::config::runtime_default_locale;
use crosstalk_summary::data::filter::{filter_set, CrosstalkEvent};
use crosstalk_summary::data::loader::load_file;
use crosstalk_summary::{Widget, WidgetKind, WidgetOutput};

#[derive(Parser)]
#[command(name = "crosstalk-summary")]
#[command(about = "Summarise a widget payload and replay crosstalk filter/selection events")]
#[command(version)]
struct Cli {
    /// Widget payload (.json) or column file (.csv, .parquet)
    input: PathBuf,

    /// Widget to render
    #[arg(short, long, value_enum, default_value = "number-span")]
    widget: WidgetKind,

    /// Statistic (count, sum, mean, quantile, wt_mean, first, mode, ...)
    #[arg(short, long)]
    statistic: Option<String>,

    /// Number format (none, decimal, percent, currency, unit)
    #[arg(short = 'f', long)]
    number_format: Option<String>,

    /// Locale tag, or "navigator.language" for the process locale
    #[arg(short, long)]
    locale: Option<String>,

    /// Fraction digits
    #[arg(short, long)]
    digits: Option<u32>,

    /// Quantile fraction in [0, 1]
    #[arg(short, long)]
    quantile: Option<f64>,

    /// ISO 4217 currency code for the currency format
    #[arg(long)]
    currency: Option<String>,

    /// Unit for the unit format (kilometer, celsius, mile-per-hour, ...)
    #[arg(long)]
    unit: Option<String>,

    /// Sign display (auto, always, exceptZero, never)
    #[arg(long)]
    sign_display: Option<String>,

    /// Notation (standard, compact)
    #[arg(long)]
    notation: Option<String>,

    /// Text sort order for min/max (ascending, descending)
    #[arg(long)]
    sort: Option<String>,

    /// Delimiter for the concatenate statistic
    #[arg(long)]
    delimiter: Option<String>,

    /// Gauge lower bound
    #[arg(long, allow_hyphen_values = true)]
    min: Option<f64>,

    /// Gauge upper bound
    #[arg(long, allow_hyphen_values = true)]
    max: Option<f64>,

    /// Crosstalk event to replay, in order: `filter:k1,k2`, `selection:k1`,
    /// `filter:` (nothing passes) or `filter` / `selection` (cleared)
    #[arg(short, long, value_parser = parse_event)]
    event: Vec<CrosstalkEvent>,

    /// Print each result as a JSON line
    #[arg(long)]
    json: bool,
}

fn parse_event(s: &str) -> Result<CrosstalkEvent, String> {
    let (kind, keys) = match s.split_once(':') {
        Some((kind, keys)) => {
            let keys = keys.split(',').map(str::trim).filter(|k| !k.is_empty());
            (kind, Some(filter_set(keys)))
        }
        None => (s, None),
    };
    match kind.trim() {
        "filter" => Ok(CrosstalkEvent::Filter(keys)),
        "selection" => Ok(CrosstalkEvent::Selection(keys)),
        other => Err(format!("unknown event kind '{other}', expected filter or selection")),
    }
}

fn describe(event: &CrosstalkEvent) -> String {
    let (kind, keys) = match event {
        CrosstalkEvent::Filter(keys) => ("filter", keys),
        CrosstalkEvent::Selection(keys) => ("selection", keys),
    };
    match keys {
        None => format!("{kind} cleared"),
        Some(keys) => {
            let keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
            format!("{kind} [{}]", keys.join(","))
        }
    }
}

fn print(label: &str, output: &WidgetOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(output).context("serialising output")?);
    } else {
        println!("{label}: {}", output.display_text());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut payload = load_file(&cli.input)?;
    if payload.data.0.is_empty() {
        log::warn!("{} has no rows", cli.input.display());
    }

    let settings = &mut payload.settings;
    settings.statistic = cli.statistic.or(settings.statistic.take());
    settings.locale = cli.locale.or(settings.locale.take());
    settings.number_format = cli.number_format.or(settings.number_format.take());
    settings.digits = cli.digits.or(settings.digits);
    settings.quantile = cli.quantile.or(settings.quantile);
    settings.currency = cli.currency.or(settings.currency.take());
    settings.unit = cli.unit.or(settings.unit.take());
    settings.sign_display = cli.sign_display.or(settings.sign_display.take());
    settings.notation = cli.notation.or(settings.notation.take());
    settings.sort = cli.sort.or(settings.sort.take());
    settings.delim = cli.delimiter.or(settings.delim.take());
    payload.min = cli.min.or(payload.min);
    payload.max = cli.max.or(payload.max);

    if let (Some(min), Some(max)) = (payload.min, payload.max) {
        if min > max {
            bail!("gauge min {min} is above max {max}");
        }
    }

    let widget = Widget::from_payload(&payload, cli.widget, &runtime_default_locale())
        .context("configuring widget")?;
    if let Some(group) = widget.group() {
        log::debug!("listening to crosstalk group '{group}'");
    }

    print("initial", &widget.render()?, cli.json)?;
    for event in &cli.event {
        print(&describe(event), &widget.handle(event)?, cli.json)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
