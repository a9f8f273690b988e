use clap::Parser;
use kodo_plots::logging::init_logging;
use kodo_plots::output::{LatexEngine, OutputFormat, OutputOptions};
use kodo_plots::storage::{Sources, StorageConfig, plot_storage};
use kodo_results::dataset::ResultSet;
use std::path::PathBuf;
use tracing::{error, info};

/// Plots the storage benchmark comparisons of Kodo against the other erasure code libraries.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding the `<library>_<platform>*.csv` result files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Platform tag of the result files
    #[arg(short, long)]
    platform: Option<String>,

    /// TOML plot list, the built-in list is used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Results archive written by merge_results, replaces the CSV files
    #[arg(short, long)]
    archive: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pdf)]
    output_format: OutputFormat,

    #[arg(short, long, value_enum, default_value_t = LatexEngine::LuaLatex)]
    engine: LatexEngine,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), ()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => StorageConfig::from_file(path)
            .map_err(|e| error!("Failed to load configuration: {}", e))?,
        None => StorageConfig::default(),
    };
    if let Some(input_dir) = args.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(platform) = args.platform {
        config.platform = platform;
    }

    let sources = match &args.archive {
        Some(path) => {
            let archive = ResultSet::read_archive(path)
                .map_err(|e| error!("Failed to read {}: {}", path.display(), e))?;
            Sources::from_archive(&archive)
        }
        None => Sources::from_csv(&config.input_dir, &config.platform)
            .map_err(|e| error!("Failed to load results: {}", e))?,
    };
    info!("Loaded {} results", sources.total_rows());

    let output = OutputOptions::new(&args.output_dir, args.output_format, args.engine);
    plot_storage(&config, &sources, &output).map_err(|e| error!("Plotting failed: {}", e))?;
    Ok(())
}
