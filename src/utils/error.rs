use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Remote request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Remote estimator returned status {status}: {body}")]
    RemoteStatusError { status: u16, body: String },

    #[error("Remote estimator timed out after {millis}ms")]
    RemoteTimeoutError { millis: u128 },
}

pub type Result<T> = std::result::Result<T, PricingError>;
