use kodo_results::ResultsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("No {table} entry for '{key}'")]
    UnknownLabel { table: &'static str, key: String },

    #[error("Parameter '{0}' has no title")]
    UnknownParameter(String),

    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Destination {} exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("Failed to create PDF {jobname}: {message}")]
    Compile { jobname: String, message: String },
}
