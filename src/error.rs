use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl MonitorError {
    /// Wrap any failure that happened while fetching or parsing `url`.
    pub fn load(url: &str, source: impl std::fmt::Display) -> Self {
        MonitorError::Load {
            url: url.to_string(),
            message: source.to_string(),
        }
    }

    pub fn is_load_error(&self) -> bool {
        matches!(self, MonitorError::Load { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MonitorError::NotFound(_))
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, MonitorError::Schema(_))
    }
}
