use std::panic::AssertUnwindSafe;
use std::time::Duration;

use ai_client::{truncate_to_char_boundary, OpenAi};
use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{info, warn};

use newsdesk_common::{ScrapedArticle, SourceSummary};

use crate::traits::ArticleSummarizer;

const SYSTEM_PROMPT: &str = r#"You are a news summarizer. You turn one news article into a complete, factual summary that another writer will rely on without seeing the article.

Capture every material point:
- what happened (the main event or issue)
- who is involved (people, organisations, places)
- when it happened (dates, timeframes)
- where it happened
- why it happened (causes, context)
- impact and consequences
- every figure, statistic and number given
- quotes from officials or other named people, attributed

Rules:
- Use only what the article says. Add nothing from outside it.
- Keep the original meaning and context.
- Leave nothing significant out, but do not pad.
- Structure the summary with short sections or bullet points."#;

fn user_prompt(article: &ScrapedArticle) -> String {
    format!(
        "Title: {}\n\nArticle Content:\n{}",
        article.title, article.body
    )
}

pub struct OpenAiSummarizer {
    ai: OpenAi,
    temperature: f32,
    max_article_bytes: usize,
}

impl OpenAiSummarizer {
    pub fn new(ai: OpenAi, temperature: f32, max_article_bytes: usize) -> Self {
        Self {
            ai,
            temperature,
            max_article_bytes,
        }
    }
}

#[async_trait]
impl ArticleSummarizer for OpenAiSummarizer {
    async fn summarize(&self, article: &ScrapedArticle) -> Result<String> {
        let body = truncate_to_char_boundary(&article.body, self.max_article_bytes);
        let article = ScrapedArticle {
            body: body.to_string(),
            ..article.clone()
        };
        let summary = self
            .ai
            .chat_completion(SYSTEM_PROMPT, user_prompt(&article), self.temperature)
            .await?;
        if summary.trim().is_empty() {
            bail!("empty summary for {}", article.link);
        }
        Ok(summary)
    }
}

/// Summarize every article concurrently. A failed, timed-out or empty
/// summary drops only its own article. Source label and link are copied from
/// the article, never from the model.
pub async fn summarize_all<'a>(
    summarizer: &'a dyn ArticleSummarizer,
    articles: &'a [ScrapedArticle],
    max_concurrency: usize,
    per_item_timeout: Duration,
) -> Vec<SourceSummary> {
    let tasks: Vec<BoxFuture<'a, Option<SourceSummary>>> = articles
        .iter()
        .map(
            |article: &'a ScrapedArticle| -> BoxFuture<'a, Option<SourceSummary>> {
                async move {
                    let attempt = AssertUnwindSafe(summarizer.summarize(article)).catch_unwind();
                    let summary = match tokio::time::timeout(per_item_timeout, attempt).await {
                        Ok(Ok(Ok(summary))) => summary,
                        Ok(Ok(Err(e))) => {
                            warn!(link = article.link.as_str(), error = %e, "Summarization failed");
                            return None;
                        }
                        Ok(Err(_)) => {
                            warn!(link = article.link.as_str(), "Summarizer panicked");
                            return None;
                        }
                        Err(_) => {
                            warn!(
                                link = article.link.as_str(),
                                timeout_secs = per_item_timeout.as_secs(),
                                "Summarization timed out"
                            );
                            return None;
                        }
                    };
                    let summary = summary.trim();
                    if summary.is_empty() {
                        return None;
                    }
                    Some(SourceSummary {
                        source: article.source.clone(),
                        link: article.link.clone(),
                        summary: summary.to_string(),
                    })
                }
                .boxed()
            },
        )
        .collect();
    let summaries: Vec<SourceSummary> = stream::iter(tasks)
        .buffer_unordered(max_concurrency.max(1))
        .filter_map(|summary| async move { summary })
        .collect()
        .await;

    info!(
        articles = articles.len(),
        summaries = summaries.len(),
        "Summarize fan-out complete"
    );
    summaries
}
