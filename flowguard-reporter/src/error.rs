use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid collector endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("reporter needs a running tokio runtime: {0}")]
    Runtime(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector answered HTTP {0}")]
    Status(u16),
}
