use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("page size must be 1 or higher")]
    InvalidPageSize,

    #[error("index request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("index request to {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("index document is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("index source i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid highlight pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, NavigatorError>;
