use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read glob entry: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to serialize archive: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),

    #[error("Failed to deserialize archive: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column '{column}' is missing from the result set")]
    MissingColumn { column: String },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
