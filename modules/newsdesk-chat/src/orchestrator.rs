use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use newsdesk_common::{CandidateArticle, PipelineConfig, ScrapedArticle, SourceSummary};
use newsdesk_scraper::{scrape_all, SourceRegistry};

use crate::bus::SessionBus;
use crate::publisher::{NoopSink, ProgressSink, PublishSink};
use crate::search::search_news;
use crate::state::{self, transition, Outcome, RunState, StageResult, ERRORED_MESSAGE};
use crate::summarizer::summarize_all;
use crate::synthesizer::synthesize;
use crate::traits::{AnswerWriter, ArticleSummarizer, NewsSearch, TranscriptStore};
use crate::validator::QueryValidator;

/// Everything a run talks to.
#[derive(Clone)]
pub struct PipelineDeps {
    pub validator: Arc<QueryValidator>,
    pub search: Arc<dyn NewsSearch>,
    pub registry: Arc<SourceRegistry>,
    pub summarizer: Arc<dyn ArticleSummarizer>,
    pub writer: Arc<dyn AnswerWriter>,
    pub transcripts: Arc<dyn TranscriptStore>,
    pub bus: Arc<SessionBus>,
}

/// Terminal result of one run. `message` is exactly what the user saw last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: Outcome,
    pub message: String,
}

impl RunReport {
    fn errored() -> Self {
        Self {
            outcome: Outcome::Errored,
            message: ERRORED_MESSAGE.to_string(),
        }
    }
}

/// Per-run scratch data. Dropped when the run ends.
#[derive(Default)]
struct RunContext {
    clarification: String,
    candidates: Vec<CandidateArticle>,
    articles: Vec<ScrapedArticle>,
    summaries: Vec<SourceSummary>,
    answer: Option<String>,
}

impl RunContext {
    fn final_message(&mut self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Rejected => std::mem::take(&mut self.clarification),
            Outcome::Done => self.answer.take().unwrap_or_default(),
            other => other.fixed_message().unwrap_or(ERRORED_MESSAGE).to_string(),
        }
    }
}

pub struct ChatPipeline {
    deps: PipelineDeps,
    config: PipelineConfig,
}

impl ChatPipeline {
    pub fn new(deps: PipelineDeps, config: PipelineConfig) -> Self {
        Self { deps, config }
    }

    pub fn bus(&self) -> &Arc<SessionBus> {
        &self.deps.bus
    }

    /// Streaming entry point. Every progress message and the final answer is
    /// persisted to the session transcript and broadcast on its topic.
    pub async fn stream_run(&self, session_id: Uuid, query: &str) -> RunReport {
        let lease = self.deps.bus.lease(session_id);
        let sink = PublishSink::new(
            self.deps.transcripts.clone(),
            lease,
            self.config.persist_timeout(),
        );
        let report = self.run(&sink, query, true).await;
        info!(%session_id, outcome = %report.outcome, "Chat run finished");
        report
    }

    /// Direct entry point. Same stages, no progress, returns the final text.
    pub async fn answer_direct(&self, query: &str, markdown: bool) -> String {
        let report = self.run(&NoopSink, query, markdown).await;
        info!(outcome = %report.outcome, "Direct answer finished");
        report.message
    }

    /// Runs the stages under the overall deadline. Panics and deadline
    /// overruns end the run as `Errored`, which publishes its own message.
    async fn run(&self, sink: &dyn ProgressSink, query: &str, markdown: bool) -> RunReport {
        let deadline = self.config.run_deadline();
        let stages = AssertUnwindSafe(self.drive(sink, query, markdown)).catch_unwind();

        match tokio::time::timeout(deadline, stages).await {
            Ok(Ok(report)) => report,
            Ok(Err(_)) => {
                error!("Chat run panicked");
                self.fail(sink).await
            }
            Err(_) => {
                warn!(deadline_secs = deadline.as_secs(), "Chat run exceeded deadline");
                self.fail(sink).await
            }
        }
    }

    async fn fail(&self, sink: &dyn ProgressSink) -> RunReport {
        let report = RunReport::errored();
        sink.publish(&report.message).await;
        report
    }

    async fn drive(&self, sink: &dyn ProgressSink, query: &str, markdown: bool) -> RunReport {
        let mut state = RunState::Validating;
        let mut ctx = RunContext::default();

        let outcome = loop {
            let result = match state {
                RunState::Finished(outcome) => break outcome,
                RunState::Validating => self.validate(query, &mut ctx).await,
                RunState::Searching => self.search(sink, query, &mut ctx).await,
                RunState::Scraping => self.scrape(sink, &mut ctx).await,
                RunState::Summarizing => self.summarize(sink, &mut ctx).await,
                RunState::Synthesizing => self.synthesize(sink, query, markdown, &mut ctx).await,
            };
            let next = transition(state, result);
            info!(from = ?state, to = ?next, "Run transition");
            state = next;
        };

        let message = ctx.final_message(outcome);
        sink.publish(&message).await;
        RunReport { outcome, message }
    }

    async fn validate(&self, query: &str, ctx: &mut RunContext) -> StageResult {
        let verdict = self.deps.validator.validate(query).await;
        if !verdict.is_valid {
            ctx.clarification = verdict.clarification_message;
        }
        StageResult::Verdict {
            valid: verdict.is_valid,
        }
    }

    async fn search(
        &self,
        sink: &dyn ProgressSink,
        query: &str,
        ctx: &mut RunContext,
    ) -> StageResult {
        sink.publish(&state::searching_message()).await;
        ctx.candidates = search_news(
            self.deps.search.as_ref(),
            query,
            self.config.collaborator_timeout(),
        )
        .await;
        if !ctx.candidates.is_empty() {
            sink.publish(&state::found_message(&ctx.candidates)).await;
        }
        StageResult::Found(ctx.candidates.len())
    }

    async fn scrape(&self, sink: &dyn ProgressSink, ctx: &mut RunContext) -> StageResult {
        ctx.articles = scrape_all(
            &self.deps.registry,
            &ctx.candidates,
            self.config.max_concurrency,
            self.config.scrape_timeout(),
        )
        .await;
        if !ctx.articles.is_empty() {
            sink.publish(&state::scraped_message(ctx.articles.len(), ctx.candidates.len()))
                .await;
        }
        StageResult::Scraped(ctx.articles.len())
    }

    async fn summarize(&self, sink: &dyn ProgressSink, ctx: &mut RunContext) -> StageResult {
        sink.publish(&state::summarizing_message(ctx.articles.len())).await;
        ctx.summaries = summarize_all(
            self.deps.summarizer.as_ref(),
            &ctx.articles,
            self.config.max_concurrency,
            self.config.summarize_timeout(),
        )
        .await;
        StageResult::Summarized(ctx.summaries.len())
    }

    async fn synthesize(
        &self,
        sink: &dyn ProgressSink,
        query: &str,
        markdown: bool,
        ctx: &mut RunContext,
    ) -> StageResult {
        sink.publish(&state::finalizing_message()).await;
        ctx.answer = synthesize(
            self.deps.writer.as_ref(),
            query,
            &ctx.summaries,
            markdown,
            self.config.synthesis_timeout(),
        )
        .await;
        StageResult::Synthesized {
            ok: ctx.answer.is_some(),
        }
    }
}
