use thiserror::Error;

pub type Result<T> = std::result::Result<T, BeagleError>;

#[derive(Debug, Error)]
pub enum BeagleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("time window {start}-{end} is empty")]
    EmptyWindow { start: String, end: String },
}
