use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
