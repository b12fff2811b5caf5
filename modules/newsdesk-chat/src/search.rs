use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serper_client::{OrganicResult, SearchRequest, SerperClient};
use tracing::{info, warn};

use newsdesk_common::CandidateArticle;

use crate::traits::NewsSearch;

/// `"{topic} (site:a OR site:b ...)"`
pub fn site_query(topic: &str, domains: &[&str]) -> String {
    let sites = domains
        .iter()
        .map(|d| format!("site:{d}"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{} ({sites})", topic.trim())
}

/// Serper search restricted to the registry's news domains.
pub struct SerperNewsSearch {
    client: SerperClient,
    domains: Vec<String>,
    region: String,
}

impl SerperNewsSearch {
    pub fn new(client: SerperClient, domains: &[&str], region: impl Into<String>) -> Self {
        Self {
            client,
            domains: domains.iter().map(|d| d.to_string()).collect(),
            region: region.into(),
        }
    }
}

#[async_trait]
impl NewsSearch for SerperNewsSearch {
    async fn search(&self, topic: &str) -> Result<Vec<CandidateArticle>> {
        let domains: Vec<&str> = self.domains.iter().map(String::as_str).collect();
        let request = SearchRequest::new(site_query(topic, &domains)).region(&self.region);
        let response = self.client.search(&request).await?;
        Ok(response.organic.into_iter().map(to_candidate).collect())
    }
}

fn to_candidate(result: OrganicResult) -> CandidateArticle {
    CandidateArticle {
        title: result.title,
        link: result.link,
        date: result.date.unwrap_or_default(),
    }
}

/// Run one search. Any failure, including a timeout, is an empty result.
pub async fn search_news(
    search: &dyn NewsSearch,
    topic: &str,
    timeout: Duration,
) -> Vec<CandidateArticle> {
    match tokio::time::timeout(timeout, search.search(topic)).await {
        Ok(Ok(candidates)) => {
            info!(count = candidates.len(), "News search complete");
            candidates
        }
        Ok(Err(e)) => {
            warn!(error = %e, "News search failed");
            Vec::new()
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "News search timed out");
            Vec::new()
        }
    }
}
