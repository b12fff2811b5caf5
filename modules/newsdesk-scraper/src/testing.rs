// Test double for page retrieval.
//
// MockPageFetcher serves canned HTML by exact URL and fails every other URL
// the way a 404 would. It also counts fetches so callers can assert that a
// stage never ran.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, ScrapeError};
use crate::fetcher::PageFetcher;

struct CannedPage {
    html: String,
    delay: Option<Duration>,
}

/// Builder: `.on_page()`, `.on_slow_page()`.
#[derive(Default)]
pub struct MockPageFetcher {
    pages: HashMap<String, CannedPage>,
    calls: AtomicUsize,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            CannedPage {
                html: html.to_string(),
                delay: None,
            },
        );
        self
    }

    pub fn on_slow_page(mut self, url: &str, html: &str, delay: Duration) -> Self {
        self.pages.insert(
            url.to_string(),
            CannedPage {
                html: html.to_string(),
                delay: Some(delay),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(page) = self.pages.get(url) else {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            });
        };
        if let Some(delay) = page.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(page.html.clone())
    }
}
