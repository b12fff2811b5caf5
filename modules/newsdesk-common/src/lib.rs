pub mod config;
pub mod error;
pub mod file_config;
pub mod types;

pub use config::AppConfig;
pub use error::NewsdeskError;
pub use file_config::{FileConfig, ModelsConfig, PipelineConfig, SearchConfig, ServerConfig};
pub use types::*;
