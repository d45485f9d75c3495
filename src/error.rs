use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Authentication failed (status {status})")]
    Auth { status: u16 },

    #[error("Concourse API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed Concourse response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
