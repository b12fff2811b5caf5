use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{info, warn};

use newsdesk_common::{CandidateArticle, ScrapedArticle};

use crate::registry::SourceRegistry;

/// Scrape every candidate concurrently, at most `max_concurrency` at a time.
/// Failures, timeouts and panics drop only their own candidate. Output order
/// is completion order.
pub async fn scrape_all<'a>(
    registry: &'a SourceRegistry,
    candidates: &'a [CandidateArticle],
    max_concurrency: usize,
    per_item_timeout: Duration,
) -> Vec<ScrapedArticle> {
    let tasks: Vec<BoxFuture<'a, Option<ScrapedArticle>>> = candidates
        .iter()
        .map(
            |candidate: &'a CandidateArticle| -> BoxFuture<'a, Option<ScrapedArticle>> {
                async move {
                    let attempt = AssertUnwindSafe(registry.extract(candidate)).catch_unwind();
                    match tokio::time::timeout(per_item_timeout, attempt).await {
                        Ok(Ok(article)) => article,
                        Ok(Err(_)) => {
                            warn!(link = candidate.link.as_str(), "Extractor panicked");
                            None
                        }
                        Err(_) => {
                            warn!(
                                link = candidate.link.as_str(),
                                timeout_secs = per_item_timeout.as_secs(),
                                "Article scrape timed out"
                            );
                            None
                        }
                    }
                }
                .boxed()
            },
        )
        .collect();
    let scraped: Vec<ScrapedArticle> = stream::iter(tasks)
        .buffer_unordered(max_concurrency.max(1))
        .filter_map(|article| async move { article })
        .collect()
        .await;

    info!(
        candidates = candidates.len(),
        scraped = scraped.len(),
        "Scrape fan-out complete"
    );
    scraped
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::extractor::ArticleExtractor;
    use crate::layout::ExtractedPage;
    use crate::testing::MockPageFetcher;

    /// Records how many extractions overlap at once.
    #[derive(Default)]
    struct PeakExtractor {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ArticleExtractor for PeakExtractor {
        async fn extract(&self, url: &str) -> Result<ExtractedPage> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ExtractedPage {
                heading: url.to_string(),
                body: "Body.".into(),
            })
        }

        fn label(&self) -> &str {
            "Peak"
        }
    }

    const KP_PAGE: &str = r#"<div id="mainContent"><main><div><div></div><div>
        <div class="col-sm-8"><h1>KP story</h1><div><div><div class="subscribe--wrapperx">
        <section><p>Body.</p></section></div></div></div></div></div></div></main></div>"#;

    fn candidate(link: &str) -> CandidateArticle {
        CandidateArticle {
            title: String::new(),
            link: link.into(),
            date: String::new(),
        }
    }

    #[tokio::test]
    async fn keeps_successes_and_drops_failures() {
        let fetcher = MockPageFetcher::new()
            .on_page("https://kathmandupost.com/a", KP_PAGE)
            .on_page("https://kathmandupost.com/b", KP_PAGE);
        let registry = SourceRegistry::nepal_news(Arc::new(fetcher));
        let candidates = vec![
            candidate("https://kathmandupost.com/a"),
            candidate("https://kathmandupost.com/missing"),
            candidate("https://kathmandupost.com/b"),
            candidate("https://unknown.example/x"),
        ];

        let mut scraped = scrape_all(&registry, &candidates, 2, Duration::from_secs(5)).await;
        scraped.sort_by(|a, b| a.link.cmp(&b.link));

        let links: Vec<_> = scraped.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://kathmandupost.com/a", "https://kathmandupost.com/b"]
        );
        assert!(scraped.iter().all(|a| a.source == "The Kathmandu Post"));
    }

    #[tokio::test]
    async fn slow_page_times_out_without_blocking_siblings() {
        let fetcher = MockPageFetcher::new()
            .on_page("https://kathmandupost.com/fast", KP_PAGE)
            .on_slow_page(
                "https://kathmandupost.com/slow",
                KP_PAGE,
                Duration::from_secs(30),
            );
        let registry = SourceRegistry::nepal_news(Arc::new(fetcher));
        let candidates = vec![
            candidate("https://kathmandupost.com/slow"),
            candidate("https://kathmandupost.com/fast"),
        ];

        let scraped = scrape_all(&registry, &candidates, 4, Duration::from_millis(50)).await;
        assert_eq!(scraped.len(), 1);
        assert_eq!(scraped[0].link, "https://kathmandupost.com/fast");
    }

    #[tokio::test]
    async fn in_flight_scrapes_never_exceed_the_bound() {
        let extractor = Arc::new(PeakExtractor::default());
        let registry = SourceRegistry::new().register("peak.example", extractor.clone());
        let candidates: Vec<_> = (0..12)
            .map(|i| candidate(&format!("https://peak.example/{i}")))
            .collect();

        let scraped = scrape_all(&registry, &candidates, 3, Duration::from_secs(5)).await;

        assert_eq!(scraped.len(), 12);
        let peak = extractor.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {peak}");
        assert!(peak >= 2);
        assert_eq!(extractor.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_candidates_is_empty() {
        let registry = SourceRegistry::nepal_news(Arc::new(MockPageFetcher::new()));
        assert!(scrape_all(&registry, &[], 4, Duration::from_secs(1))
            .await
            .is_empty());
    }
}
