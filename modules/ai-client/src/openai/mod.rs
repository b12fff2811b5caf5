mod client;
pub mod prompt_builder;
pub(crate) mod schema;
pub(crate) mod types;

pub use prompt_builder::{OpenAiOutputBuilder, OpenAiPromptBuilder};
pub use schema::StructuredOutput;

use crate::traits::{Agent, OutputBuilder, PromptBuilder};
use anyhow::Result;

use client::OpenAiClient;

const DEFAULT_MAX_TOKENS: u32 = 4096;

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            http: reqwest::Client::new(),
        }
    }

    /// Share one connection pool across agents built for different models.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Same credentials and transport, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        OpenAiClient::new(&self.api_key, self.http.clone())
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// Type-safe structured output extraction.
    pub async fn extract<T: StructuredOutput + Send + 'static>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        self.prompt(user_prompt)
            .preamble(system_prompt)
            .output::<T>()
            .send()
            .await
    }

    /// Single system + user turn at the given temperature.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
    ) -> Result<String> {
        self.prompt(user)
            .preamble(system)
            .temperature(temperature)
            .send()
            .await
    }
}

// =============================================================================
// Agent Implementation
// =============================================================================

impl Agent for OpenAi {
    type PromptBuilder = OpenAiPromptBuilder;

    fn prompt(&self, input: impl Into<String>) -> OpenAiPromptBuilder {
        OpenAiPromptBuilder::new(self.clone(), input.into())
    }
}
