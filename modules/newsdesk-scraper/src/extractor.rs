use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::layout::{ExtractedPage, SiteLayout};

/// Turns an article URL on one particular site into heading + body.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedPage>;

    /// Attribution label for articles this extractor produces.
    fn label(&self) -> &str;
}

/// Fetch-then-select extractor driven by a static [`SiteLayout`].
pub struct SiteExtractor {
    layout: SiteLayout,
    fetcher: Arc<dyn PageFetcher>,
}

impl SiteExtractor {
    pub fn new(layout: SiteLayout, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { layout, fetcher }
    }
}

#[async_trait]
impl ArticleExtractor for SiteExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedPage> {
        let html = self.fetcher.fetch(url).await?;
        self.layout.extract(&html)
    }

    fn label(&self) -> &str {
        self.layout.label
    }
}
