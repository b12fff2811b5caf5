pub mod error;

pub use error::{Result, SerperError};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_SEARCH_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub q: String,
    /// Country hint, e.g. `"np"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            gl: None,
        }
    }

    pub fn region(mut self, gl: impl Into<String>) -> Self {
        self.gl = Some(gl.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
}

pub struct SerperClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: &str, api_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SerperError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Run one search. An error-shaped body is reported as `SerperError::Reported`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        info!(query = %request.q, gl = ?request.gl, "Serper search");

        let resp = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SerperError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: SearchResponse = resp.json().await?;
        if let Some(error) = data.error {
            return Err(SerperError::Reported(error));
        }

        info!(query = %request.q, count = data.organic.len(), "Serper search complete");
        Ok(data)
    }
}
