use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl Error {
    /// Upstream service refusals (rate limits and HTTP error statuses). A tier
    /// failing with one is logged as a warning rather than an error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::Api { .. })
    }
}
