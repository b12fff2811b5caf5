use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsdeskError {
    #[error("Configuration error: {0}")]
    Config(String),
}
