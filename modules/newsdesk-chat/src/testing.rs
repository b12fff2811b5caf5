// Test mocks for the chat pipeline.
//
// One mock per trait seam:
// - MockClassifier (IntentClassifier): fixed verdict or error
// - MockSearch (NewsSearch): fixed candidates, error or panic
// - MockSummarizer (ArticleSummarizer): per-link summaries, default for the rest
// - MockWriter (AnswerWriter): fixed answer, error, or a citing answer
// - InMemoryTranscripts (TranscriptStore), InMemorySessions (SessionStore)
//
// Page fetching uses newsdesk_scraper::testing::MockPageFetcher, so scrape
// tests run the real site extractors. `Harness` wires all of them into a
// ChatPipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use newsdesk_common::{
    CandidateArticle, IntentVerdict, PipelineConfig, Role, ScrapedArticle, Session,
    SourceSummary, TranscriptMessage,
};
use newsdesk_scraper::testing::MockPageFetcher;
use newsdesk_scraper::SourceRegistry;

use crate::bus::SessionBus;
use crate::orchestrator::{ChatPipeline, PipelineDeps};
use crate::traits::{
    AnswerWriter, ArticleSummarizer, IntentClassifier, NewsSearch, SessionStore, TranscriptStore,
};
use crate::validator::QueryValidator;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn candidate(title: &str, link: &str) -> CandidateArticle {
    CandidateArticle {
        title: title.to_string(),
        link: link.to_string(),
        date: "1 day ago".to_string(),
    }
}

pub fn article(source: &str, link: &str) -> ScrapedArticle {
    ScrapedArticle {
        title: format!("{source} headline"),
        body: format!("Body text from {source}."),
        source: source.to_string(),
        link: link.to_string(),
        date: "1 day ago".to_string(),
    }
}

pub fn summary(source: &str, link: &str, text: &str) -> SourceSummary {
    SourceSummary {
        source: source.to_string(),
        link: link.to_string(),
        summary: text.to_string(),
    }
}

/// Short timeouts so failure tests finish quickly.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        max_concurrency: 4,
        scrape_timeout_secs: 2,
        summarize_timeout_secs: 2,
        synthesis_timeout_secs: 2,
        collaborator_timeout_secs: 2,
        run_deadline_secs: 10,
        persist_timeout_secs: 2,
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

pub struct MockClassifier {
    verdict: std::result::Result<IntentVerdict, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn accepting() -> Self {
        Self::with_result(Ok(IntentVerdict {
            is_valid: true,
            reason: "news query".to_string(),
            clarification_message: String::new(),
        }))
    }

    pub fn rejecting(clarification: &str) -> Self {
        Self::with_result(Ok(IntentVerdict::rejected("not news", clarification)))
    }

    pub fn failing(error: &str) -> Self {
        Self::with_result(Err(error.to_string()))
    }

    fn with_result(verdict: std::result::Result<IntentVerdict, String>) -> Self {
        Self {
            verdict,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(&self, _query: &str) -> Result<IntentVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.verdict.clone().map_err(|e| anyhow!(e))
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

pub struct MockSearch {
    results: std::result::Result<Vec<CandidateArticle>, String>,
    panics: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSearch {
    pub fn returning(results: Vec<CandidateArticle>) -> Self {
        Self {
            results: Ok(results),
            panics: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            results: Err(error.to_string()),
            ..Self::returning(Vec::new())
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::returning(Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSearch for MockSearch {
    async fn search(&self, _topic: &str) -> Result<Vec<CandidateArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("search backend exploded");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results.clone().map_err(|e| anyhow!(e))
    }
}

// ---------------------------------------------------------------------------
// MockSummarizer
// ---------------------------------------------------------------------------

/// Registered links get their canned summary; every other article gets
/// `"Summary of {title}"`. Builder: `.on_link()`, `.failing_link()`,
/// `.with_delay_for()`, `.failing_all()`.
#[derive(Default)]
pub struct MockSummarizer {
    responses: HashMap<String, std::result::Result<String, String>>,
    delays: HashMap<String, Duration>,
    fail_all: bool,
    calls: AtomicUsize,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_link(mut self, link: &str, summary: &str) -> Self {
        self.responses
            .insert(link.to_string(), Ok(summary.to_string()));
        self
    }

    pub fn failing_link(mut self, link: &str) -> Self {
        self.responses
            .insert(link.to_string(), Err(format!("model error for {link}")));
        self
    }

    pub fn with_delay_for(mut self, link: &str, delay: Duration) -> Self {
        self.delays.insert(link.to_string(), delay);
        self
    }

    pub fn failing_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSummarizer for MockSummarizer {
    async fn summarize(&self, article: &ScrapedArticle) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&article.link) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_all {
            bail!("summarizer unavailable");
        }
        match self.responses.get(&article.link) {
            Some(response) => response.clone().map_err(|e| anyhow!(e)),
            None => Ok(format!("Summary of {}", article.title)),
        }
    }
}

// ---------------------------------------------------------------------------
// MockWriter
// ---------------------------------------------------------------------------

enum WriterBehavior {
    Answer(String),
    Fail(String),
    Cite,
}

/// Records the summaries it was given. `citing()` writes one Markdown line
/// per summary: `According to [source](link): summary`.
pub struct MockWriter {
    behavior: WriterBehavior,
    received: Mutex<Vec<SourceSummary>>,
    calls: AtomicUsize,
}

impl MockWriter {
    fn with_behavior(behavior: WriterBehavior) -> Self {
        Self {
            behavior,
            received: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(answer: &str) -> Self {
        Self::with_behavior(WriterBehavior::Answer(answer.to_string()))
    }

    pub fn failing(error: &str) -> Self {
        Self::with_behavior(WriterBehavior::Fail(error.to_string()))
    }

    pub fn citing() -> Self {
        Self::with_behavior(WriterBehavior::Cite)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<SourceSummary> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerWriter for MockWriter {
    async fn write(
        &self,
        _query: &str,
        summaries: &[SourceSummary],
        _markdown: bool,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.received.lock().unwrap() = summaries.to_vec();
        match &self.behavior {
            WriterBehavior::Answer(answer) => Ok(answer.clone()),
            WriterBehavior::Fail(error) => bail!("{error}"),
            WriterBehavior::Cite => {
                let mut lines: Vec<String> = summaries
                    .iter()
                    .map(|s| format!("According to [{}]({}): {}", s.source, s.link, s.summary))
                    .collect();
                lines.sort();
                Ok(lines.join("\n"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// InMemoryTranscripts
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryTranscripts {
    rows: Mutex<Vec<TranscriptMessage>>,
    fail: bool,
    ack_delay: Option<Duration>,
    stall: Option<Duration>,
}

impl InMemoryTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The row is stored immediately, but the append only returns after
    /// `delay`, like a database that commits before the client hears back.
    pub fn with_ack_delay(mut self, delay: Duration) -> Self {
        self.ack_delay = Some(delay);
        self
    }

    /// Every append waits `delay` before storing anything.
    pub fn stalling(mut self, delay: Duration) -> Self {
        self.stall = Some(delay);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contents(&self, session_id: Uuid, role: Role) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id && m.role == role)
            .map(|m| m.content.clone())
            .collect()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscripts {
    async fn append(
        &self,
        session_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<TranscriptMessage> {
        if self.fail {
            bail!("transcript store unavailable");
        }
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        let now = Utc::now();
        let message = TranscriptMessage {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(message.clone());
        if let Some(delay) = self.ack_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(message)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<TranscriptMessage>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// InMemorySessions
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemorySessions {
    sessions: Mutex<Vec<Session>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn create(&self, owner_id: Uuid, title: &str) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Session>> {
        let mut owned: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        owned.reverse();
        Ok(owned)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && s.owner_id == owner_id)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Mocked collaborators plus the pipeline built from them. Fields stay
/// public so tests can assert on call counts after a run.
pub struct Harness {
    pub classifier: Arc<MockClassifier>,
    pub search: Arc<MockSearch>,
    pub fetcher: Arc<MockPageFetcher>,
    pub summarizer: Arc<MockSummarizer>,
    pub writer: Arc<MockWriter>,
    pub transcripts: Arc<InMemoryTranscripts>,
    pub bus: Arc<SessionBus>,
    pub config: PipelineConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(MockClassifier::accepting()),
            search: Arc::new(MockSearch::returning(Vec::new())),
            fetcher: Arc::new(MockPageFetcher::new()),
            summarizer: Arc::new(MockSummarizer::new()),
            writer: Arc::new(MockWriter::citing()),
            transcripts: Arc::new(InMemoryTranscripts::new()),
            bus: Arc::new(SessionBus::default()),
            config: test_config(),
        }
    }

    pub fn classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn search(mut self, search: MockSearch) -> Self {
        self.search = Arc::new(search);
        self
    }

    pub fn fetcher(mut self, fetcher: MockPageFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn summarizer(mut self, summarizer: MockSummarizer) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    pub fn writer(mut self, writer: MockWriter) -> Self {
        self.writer = Arc::new(writer);
        self
    }

    pub fn transcripts(mut self, transcripts: InMemoryTranscripts) -> Self {
        self.transcripts = Arc::new(transcripts);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pipeline(&self) -> ChatPipeline {
        let validator = QueryValidator::new(
            self.classifier.clone(),
            self.config.collaborator_timeout(),
        );
        let deps = PipelineDeps {
            validator: Arc::new(validator),
            search: self.search.clone(),
            registry: Arc::new(SourceRegistry::nepal_news(self.fetcher.clone())),
            summarizer: self.summarizer.clone(),
            writer: self.writer.clone(),
            transcripts: self.transcripts.clone(),
            bus: self.bus.clone(),
        };
        ChatPipeline::new(deps, self.config.clone())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
