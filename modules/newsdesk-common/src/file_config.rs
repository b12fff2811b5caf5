use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::NewsdeskError;

/// TOML-backed tuning loaded from disk. Secrets stay in env vars.
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileConfig {
    pub models: ModelsConfig,
    pub pipeline: PipelineConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ModelsConfig {
    pub validation: String,
    pub summarization: String,
    pub synthesis: String,
    pub summarization_temperature: f32,
    pub synthesis_temperature: f32,
    /// Article bodies longer than this are cut before summarization.
    pub max_article_bytes: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            validation: "gpt-4.1".to_string(),
            summarization: "gpt-4".to_string(),
            synthesis: "gpt-4.1".to_string(),
            summarization_temperature: 0.3,
            synthesis_temperature: 0.3,
            max_article_bytes: 24_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// Upper bound on in-flight scrape or summarize tasks per run.
    pub max_concurrency: usize,
    pub scrape_timeout_secs: u64,
    pub summarize_timeout_secs: u64,
    pub synthesis_timeout_secs: u64,
    /// Applies to the intent classifier and the search call.
    pub collaborator_timeout_secs: u64,
    pub run_deadline_secs: u64,
    /// Bound on each transcript append made while publishing progress.
    pub persist_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 6,
            scrape_timeout_secs: 20,
            summarize_timeout_secs: 90,
            synthesis_timeout_secs: 120,
            collaborator_timeout_secs: 30,
            run_deadline_secs: 300,
            persist_timeout_secs: 10,
        }
    }
}

impl PipelineConfig {
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_secs(self.summarize_timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_secs(self.persist_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    /// Serper `gl` country hint.
    pub region: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            region: "np".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: Vec::new(),
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content)?;
    if config.pipeline.max_concurrency == 0 {
        return Err(NewsdeskError::Config(
            "pipeline.max_concurrency must be at least 1".to_string(),
        )
        .into());
    }
    Ok(config)
}
