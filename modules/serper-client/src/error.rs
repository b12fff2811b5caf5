use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerperError>;

#[derive(Debug, Error)]
pub enum SerperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serper reported an error: {0}")]
    Reported(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for SerperError {
    fn from(err: reqwest::Error) -> Self {
        SerperError::Network(err.to_string())
    }
}
