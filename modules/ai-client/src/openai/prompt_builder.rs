use std::marker::PhantomData;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AiError;
use crate::traits::{OutputBuilder, PromptBuilder};

use super::schema::StructuredOutput;
use super::types::*;
use super::OpenAi;

pub struct OpenAiPromptBuilder {
    agent: OpenAi,
    input: String,
    preamble: Option<String>,
    temperature: Option<f32>,
}

impl OpenAiPromptBuilder {
    pub(crate) fn new(agent: OpenAi, input: String) -> Self {
        Self {
            agent,
            input,
            preamble: None,
            temperature: None,
        }
    }

    /// Create a structured output builder for extracting typed data.
    pub fn output<T: DeserializeOwned + JsonSchema + Send + 'static>(
        self,
    ) -> OpenAiOutputBuilder<T> {
        OpenAiOutputBuilder {
            builder: self,
            _phantom: PhantomData,
        }
    }

    /// System preamble (when set) followed by the user turn.
    fn wire_messages(&self) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref preamble) = self.preamble {
            messages.push(WireMessage::system(preamble));
        }
        if !self.input.is_empty() {
            messages.push(WireMessage::user(&self.input));
        }
        messages
    }
}

#[async_trait]
impl PromptBuilder for OpenAiPromptBuilder {
    fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    async fn send(self) -> Result<String> {
        let mut request = ChatRequest::new(&self.agent.model)
            .messages(self.wire_messages())
            .token_limit(self.agent.max_tokens);

        if let Some(temp) = self.temperature {
            request = request.temperature(temp);
        }

        let response = self.agent.client().chat(&request).await?;

        response
            .into_content()
            .ok_or_else(|| AiError::EmptyResponse(self.agent.model.clone()).into())
    }
}

// =============================================================================
// Structured Output Builder
// =============================================================================

pub struct OpenAiOutputBuilder<T> {
    builder: OpenAiPromptBuilder,
    _phantom: PhantomData<T>,
}

#[async_trait]
impl<T: DeserializeOwned + JsonSchema + Send + 'static> OutputBuilder<T>
    for OpenAiOutputBuilder<T>
{
    async fn send(self) -> Result<T> {
        debug!(
            type_name = T::type_name(),
            "OpenAI structured output extraction"
        );

        let model = &self.builder.agent.model;
        let request = ChatRequest::new(model)
            .messages(self.builder.wire_messages())
            .temperature(self.builder.temperature.unwrap_or(0.0))
            .json_schema(T::openai_schema());

        let response = self.builder.agent.client().chat(&request).await?;
        let json_str = response
            .into_content()
            .ok_or_else(|| AiError::EmptyResponse(model.clone()))?;

        serde_json::from_str(crate::util::strip_code_blocks(&json_str))
            .map_err(|e| anyhow!("Failed to deserialize response: {}", e))
    }
}
