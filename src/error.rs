use thiserror::Error;

pub type Result<T> = std::result::Result<T, GnomyError>;

#[derive(Error, Debug)]
pub enum GnomyError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inventory parse error: {0}")]
    Inventory(String),

    #[error("GRIB decode error: {0}")]
    Grib(String),

    #[error("Unsupported GRIB {kind} template {number}")]
    UnsupportedTemplate { kind: &'static str, number: u16 },

    #[error("Site validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Cache error: {0}")]
    Cache(String),
}
