use anyhow::Result;

use crate::error::NewsdeskError;

/// Secrets and environment-specific values. Tuning knobs live in the TOML
/// [`FileConfig`](crate::FileConfig).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // AI / LLM
    pub openai_api_key: String,

    // Search
    pub serper_api_key: String,
    pub serper_api_url: String,

    // Auth
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: required("DATABASE_URL")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            serper_api_key: required("SERPER_API_KEY")?,
            serper_api_url: std::env::var("SERPER_API_URL")
                .unwrap_or_else(|_| "https://google.serper.dev/search".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_issuer: std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  SERPER_API_KEY: {}", preview(&self.serper_api_key));
        tracing::info!("  SERPER_API_URL: {}", self.serper_api_url);
        tracing::info!("  JWT_SECRET: {}", preview(&self.jwt_secret));
        tracing::info!(
            "  JWT_ISSUER: {}",
            self.jwt_issuer.as_deref().unwrap_or("<not set>")
        );
    }
}

fn required(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(NewsdeskError::Config(format!("{key} environment variable is required")).into()),
    }
}

fn preview(val: &str) -> String {
    let n = val
        .char_indices()
        .nth(5)
        .map(|(i, _)| i)
        .unwrap_or(val.len());
    format!("{}...({} chars)", &val[..n], val.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_hides_all_but_prefix() {
        assert_eq!(preview("sk-abcdef123"), "sk-ab...(12 chars)");
        assert_eq!(preview("abc"), "abc...(3 chars)");
    }
}
