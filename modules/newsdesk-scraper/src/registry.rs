use std::sync::Arc;

use tracing::{debug, warn};

use newsdesk_common::{CandidateArticle, ScrapedArticle};

use crate::extractor::{ArticleExtractor, SiteExtractor};
use crate::fetcher::PageFetcher;
use crate::sites;

/// Host-pattern dispatch table. First pattern contained in the link wins.
pub struct SourceRegistry {
    entries: Vec<(String, Arc<dyn ArticleExtractor>)>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The five trusted Nepali news sites, all fetched through `fetcher`.
    pub fn nepal_news(fetcher: Arc<dyn PageFetcher>) -> Self {
        sites::all()
            .into_iter()
            .fold(Self::new(), |registry, layout| {
                let extractor = SiteExtractor::new(layout, fetcher.clone());
                registry.register(layout.host, Arc::new(extractor))
            })
    }

    pub fn register(mut self, host_pattern: &str, extractor: Arc<dyn ArticleExtractor>) -> Self {
        self.entries
            .push((host_pattern.to_lowercase(), extractor));
        self
    }

    /// Host patterns in dispatch order. Used to build the site-restricted
    /// search query.
    pub fn site_domains(&self) -> Vec<&str> {
        self.entries.iter().map(|(host, _)| host.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, link: &str) -> Option<&Arc<dyn ArticleExtractor>> {
        let link = link.to_lowercase();
        self.entries
            .iter()
            .find(|(host, _)| link.contains(host.as_str()))
            .map(|(_, extractor)| extractor)
    }

    /// Scrape one candidate. `None` when no site matches or the page could
    /// not be fetched; partial pages (sentinel heading/body) still count.
    pub async fn extract(&self, candidate: &CandidateArticle) -> Option<ScrapedArticle> {
        let Some(extractor) = self.resolve(&candidate.link) else {
            debug!(link = candidate.link.as_str(), "No extractor for link");
            return None;
        };

        match extractor.extract(&candidate.link).await {
            Ok(page) => Some(ScrapedArticle {
                title: page.heading,
                body: page.body,
                source: extractor.label().to_string(),
                link: candidate.link.clone(),
                date: candidate.date.clone(),
            }),
            Err(e) => {
                warn!(link = candidate.link.as_str(), error = %e, "Article scrape failed");
                None
            }
        }
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
