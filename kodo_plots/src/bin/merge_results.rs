use clap::Parser;
use kodo_plots::logging::init_logging;
use kodo_plots::storage::{Sources, merge_into};
use std::path::PathBuf;
use tracing::error;

/**
Gathers the CSV results of every library for one platform into a single archive, which
plot_storage reads back with `--archive`.

The destination is never overwritten.
*/
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    #[arg(short, long, default_value = "debian6")]
    platform: String,

    /// `.results.msgpack` or `.results.msgpack.zst`
    dest: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), ()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let sources = Sources::from_csv(&args.input_dir, &args.platform)
        .map_err(|e| error!("Failed to load results: {}", e))?;
    merge_into(&args.dest, &sources).map_err(|e| error!("Merge failed: {}", e))?;
    Ok(())
}
