use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// Browser-like UA. Several of the news sites reject the reqwest default.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Raw page retrieval. Extractors parse whatever this returns.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let html = resp.text().await?;
        debug!(url, bytes = html.len(), "Fetched page");
        Ok(html)
    }
}
