use anyhow::Result;
use async_trait::async_trait;

/// A model endpoint that accepts one prompt per request.
pub trait Agent: Clone + Send + Sync {
    type PromptBuilder: PromptBuilder;

    /// Start a request whose user turn is `input`.
    fn prompt(&self, input: impl Into<String>) -> Self::PromptBuilder;
}

/// Single-turn request: optional system preamble, then the user input.
#[async_trait]
pub trait PromptBuilder: Send + Sized {
    fn preamble(self, preamble: impl Into<String>) -> Self;
    fn temperature(self, temperature: f32) -> Self;
    /// Free-text completion.
    async fn send(self) -> Result<String>;
}

/// Request whose reply is decoded into `T`.
#[async_trait]
pub trait OutputBuilder<T>: Send {
    async fn send(self) -> Result<T>;
}
