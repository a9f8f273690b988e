use chrono::Utc;
use clap::Parser;
use kodo_plots::logging::init_logging;
use kodo_plots::output::{LatexEngine, OutputFormat, OutputOptions};
use kodo_plots::throughput::plot_nightly;
use kodo_results::nightly::{NightlyQuery, parse_date, read_json};
use std::path::PathBuf;
use tracing::{error, info};

/// Plots the throughput measured by the nightly benchmark run of the day before `--date`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON export of the benchmark database
    #[arg(short, long)]
    json: PathBuf,

    /// encoder or decoder
    #[arg(short, long, default_value = "encoder")]
    coder: String,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pdf)]
    output_format: OutputFormat,

    /// YYYY-MM-DD, today if absent
    #[arg(short, long)]
    date: Option<String>,

    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(short, long, value_enum, default_value_t = LatexEngine::LuaLatex)]
    engine: LatexEngine,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), ()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let date = match &args.date {
        Some(date) => parse_date(date).map_err(|e| error!("{}", e))?,
        None => Utc::now().date_naive(),
    };
    let results = read_json(&args.json)
        .map_err(|e| error!("Failed to read {}: {}", args.json.display(), e))?;

    let query = NightlyQuery::for_day(args.coder, date);
    let output = OutputOptions::new(&args.output_dir, args.output_format, args.engine);
    let written =
        plot_nightly(&results, &query, &output).map_err(|e| error!("Plotting failed: {}", e))?;
    info!("Wrote {} files", written.len());
    Ok(())
}
