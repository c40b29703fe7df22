use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("timestamp format error: {0}")]
    Timestamp(#[from] time::error::Format),
}
