mod catalog;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod wizard;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::catalog::loader::load_fallbacks;
use crate::catalog::{CatalogSource, FeatureCatalog, Quantity};
use crate::input::{InputError, Readings, TimeOfDay, load_readings, parse_number};
use crate::model::{DEFAULT_MODEL_PATH, ModelError, load_regressor};
use crate::pipeline::stage4_report::write_reports;
use crate::pipeline::{PredictError, run_prediction};
use crate::report::ReportData;
use crate::report::json::render_prediction_json;
use crate::report::text::render_report_text;
use crate::wizard::WizardSession;
use crate::wizard::prompt::run_wizard;

#[derive(Debug, Parser)]
#[command(
    name = "kira-yield",
    version,
    about = "Estimate greenhouse cucumber total yield from six environmental readings."
)]
struct Cli {
    /// Trained model artifact (JSON, optionally .gz). A missing file selects the stub model.
    #[arg(long, global = true, env = "KIRA_YIELD_MODEL", default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Replacement fallback table, `feature<TAB>value` per line.
    #[arg(long, global = true)]
    fallbacks: Option<PathBuf>,

    /// More log output on stderr; repeat for debug and trace.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log errors only.
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Collect the readings step by step and predict.
    Wizard,
    /// Predict once from flags and/or a readings file.
    Predict(PredictArgs),
    /// Print the feature catalog with its fallback values.
    Catalog,
}

#[derive(Debug, Clone, Default, Args)]
struct PredictArgs {
    /// Time of the readings, HH:MM in 5-minute steps. Display only.
    #[arg(long)]
    time: Option<TimeOfDay>,
    /// W/m²
    #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
    sunlight: Option<f64>,
    /// °C
    #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
    temperature: Option<f64>,
    /// %
    #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
    humidity: Option<f64>,
    /// ppm
    #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
    co2: Option<f64>,
    /// MJ/m²
    #[arg(long, value_parser = parse_number, allow_negative_numbers = true)]
    accumulated_sunlight: Option<f64>,
    /// `key<TAB>value` readings file; flags override its values.
    #[arg(long)]
    readings: Option<PathBuf>,
    /// Print the JSON report instead of text.
    #[arg(long)]
    json: bool,
    /// Also write report.txt and prediction.json into this directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let catalog = load_catalog(cli.fallbacks.as_deref())?;

    if let Command::Catalog = cli.command {
        print!("{}", catalog.render_tsv());
        return Ok(());
    }

    let regressor = load_regressor(&cli.model)?;
    tracing::info!(
        mode = regressor.mode().as_str(),
        source = %regressor.describe_source(),
        "model ready"
    );

    match cli.command {
        Command::Wizard => {
            let mut session = WizardSession::new();
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout().lock();
            let summary =
                run_wizard(&mut session, &catalog, &regressor, stdin.lock(), &mut stdout)?;
            stdout.flush()?;
            tracing::info!(
                predictions = summary.predictions,
                failed = summary.failed_predictions,
                "wizard session ended"
            );
        }
        Command::Predict(args) => {
            let readings = build_readings(&args)?;
            let prediction = run_prediction(&readings, &catalog, &regressor)?;
            let data = ReportData::new(&prediction, &regressor);
            if args.json {
                println!("{}", render_prediction_json(&data)?);
            } else {
                print!("{}", render_report_text(&data));
            }
            if let Some(out) = &args.out {
                write_reports(&data, out)?;
            }
        }
        Command::Catalog => {}
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<FeatureCatalog, InputError> {
    let catalog = match path {
        Some(p) => load_fallbacks(p)?,
        None => FeatureCatalog::builtin(),
    };
    match catalog.source() {
        CatalogSource::Builtin => tracing::debug!("using builtin fallback table"),
        CatalogSource::File(p) => tracing::info!(path = %p.display(), "using fallback table"),
    }
    Ok(catalog)
}

fn build_readings(args: &PredictArgs) -> Result<Readings, InputError> {
    let mut readings = match &args.readings {
        Some(path) => load_readings(path)?,
        None => Readings::default(),
    };
    let mut flags = Readings::default();
    flags.time = args.time;
    flags.set(Quantity::Sunlight, args.sunlight);
    flags.set(Quantity::Temperature, args.temperature);
    flags.set(Quantity::Humidity, args.humidity);
    flags.set(Quantity::Co2, args.co2);
    flags.set(Quantity::AccumulatedSunlight, args.accumulated_sunlight);
    readings.overlay(&flags);
    Ok(readings)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
