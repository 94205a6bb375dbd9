use msi_results::MaterializationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Materialization error: {0}")]
    Materialization(#[from] MaterializationError),

    #[error("Error reading {path}: {msg}")]
    DataReading { path: String, msg: String },

    #[error("Logging setup error: {0}")]
    Logging(String),
}
