use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ai_client::OpenAi;
use newsdesk_chat::{
    ChatPipeline, OpenAiAnswerWriter, OpenAiIntentClassifier, OpenAiSummarizer, PipelineDeps,
    QueryValidator, SerperNewsSearch, SessionBus, TranscriptStore,
};
use newsdesk_common::{AppConfig, FileConfig};
use newsdesk_scraper::{HttpPageFetcher, SourceRegistry};
use serper_client::SerperClient;

/// Wire the production collaborators into a pipeline.
pub fn build_pipeline(
    config: &AppConfig,
    file_config: &FileConfig,
    transcripts: Arc<dyn TranscriptStore>,
) -> Result<ChatPipeline> {
    let models = &file_config.models;
    let pipeline = &file_config.pipeline;

    // One connection pool shared by the three model roles.
    let http = reqwest::Client::builder()
        .timeout(pipeline.synthesis_timeout())
        .build()
        .context("Failed to build OpenAI HTTP client")?;
    let openai = OpenAi::new(&config.openai_api_key, &models.validation).with_http_client(http);

    let classifier = OpenAiIntentClassifier::new(openai.clone());
    let summarizer = OpenAiSummarizer::new(
        openai.with_model(&models.summarization),
        models.summarization_temperature,
        models.max_article_bytes,
    );
    let writer = OpenAiAnswerWriter::new(
        openai.with_model(&models.synthesis),
        models.synthesis_temperature,
    );

    let fetcher = HttpPageFetcher::new(pipeline.scrape_timeout())?;
    let registry = SourceRegistry::nepal_news(Arc::new(fetcher));

    let serper = SerperClient::new(
        &config.serper_api_key,
        &config.serper_api_url,
        pipeline.collaborator_timeout(),
    )?;
    let search = SerperNewsSearch::new(serper, &registry.site_domains(), &file_config.search.region);

    info!(
        validation = %models.validation,
        summarization = %models.summarization,
        synthesis = %models.synthesis,
        sites = registry.len(),
        "Chat pipeline configured"
    );

    let deps = PipelineDeps {
        validator: Arc::new(QueryValidator::new(
            Arc::new(classifier),
            pipeline.collaborator_timeout(),
        )),
        search: Arc::new(search),
        registry: Arc::new(registry),
        summarizer: Arc::new(summarizer),
        writer: Arc::new(writer),
        transcripts,
        bus: Arc::new(SessionBus::default()),
    };

    Ok(ChatPipeline::new(deps, pipeline.clone()))
}
