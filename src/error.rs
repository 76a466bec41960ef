use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required field is missing: {0}")]
    MissingField(&'static str),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Nothing to export")]
    NothingToExport,
}
