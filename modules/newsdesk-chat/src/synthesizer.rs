use std::time::Duration;

use ai_client::OpenAi;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use newsdesk_common::SourceSummary;

use crate::format::finalize_answer;
use crate::traits::AnswerWriter;

const GROUNDING_RULES: &str = r#"You answer a user's question about the news using ONLY the article summaries provided. Each summary is labelled with its source name and link.

How to answer:
- Start directly with the answer. No greetings, no small talk.
- When several sources report the same thing, group them ("According to The Kathmandu Post and The Himalayan Times, ...").
- When sources differ, present each source's account separately.
- When sources contradict each other, say so explicitly and state what each source claims.
- Attribute every statement to the source or sources it came from.
- If the summaries do not contain enough information to answer, say so plainly.

Never:
- add information, opinions or speculation that is not in the summaries
- invent sources, figures or quotes
- use tables"#;

const MARKDOWN_STYLE: &str = r#"Formatting:
- Use Markdown: short sections, bullet points and **bold** for key facts where they help.
- Cite sources as inline links using the exact source name and link given, e.g. [The Kathmandu Post](https://kathmandupost.com/...)."#;

const PLAIN_STYLE: &str = r#"Formatting:
- Plain text only. Do not use any Markdown or markup: no asterisks, no pound signs, no square brackets, no bold, no headings, no tables.
- For lists use numbered items (1. 2. 3.).
- Cite sources as the source name followed by its link in parentheses, e.g. The Kathmandu Post (https://kathmandupost.com/...)."#;

fn system_prompt(markdown: bool) -> String {
    let style = if markdown { MARKDOWN_STYLE } else { PLAIN_STYLE };
    format!("{GROUNDING_RULES}\n\n{style}")
}

fn user_prompt(query: &str, summaries: &[SourceSummary]) -> String {
    let blocks = summaries
        .iter()
        .map(|s| format!("Source: {}\nLink: {}\nSummary: {}", s.source, s.link, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("User Query: {query}\n\nNews Summaries:\n{blocks}")
}

pub struct OpenAiAnswerWriter {
    ai: OpenAi,
    temperature: f32,
}

impl OpenAiAnswerWriter {
    pub fn new(ai: OpenAi, temperature: f32) -> Self {
        Self { ai, temperature }
    }
}

#[async_trait]
impl AnswerWriter for OpenAiAnswerWriter {
    async fn write(
        &self,
        query: &str,
        summaries: &[SourceSummary],
        markdown: bool,
    ) -> Result<String> {
        self.ai
            .chat_completion(
                system_prompt(markdown),
                user_prompt(query, summaries),
                self.temperature,
            )
            .await
    }
}

/// Produce the final cited answer, or `None` when the writer failed, timed
/// out or returned nothing usable.
pub async fn synthesize(
    writer: &dyn AnswerWriter,
    query: &str,
    summaries: &[SourceSummary],
    markdown: bool,
    timeout: Duration,
) -> Option<String> {
    let raw = match tokio::time::timeout(timeout, writer.write(query, summaries, markdown)).await
    {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            warn!(error = %e, "Answer synthesis failed");
            return None;
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Answer synthesis timed out");
            return None;
        }
    };

    let answer = finalize_answer(&raw, markdown);
    if answer.is_empty() {
        warn!("Answer synthesis returned empty text");
        return None;
    }
    info!(
        sources = summaries.len(),
        markdown,
        chars = answer.len(),
        "Answer synthesized"
    );
    Some(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{summary, MockWriter};

    #[test]
    fn user_prompt_lists_each_source_with_link() {
        let summaries = vec![
            summary("The Kathmandu Post", "https://kathmandupost.com/a", "12 dead"),
            summary("Nepali Times", "https://nepalitimes.com/b", "10 dead"),
        ];
        assert_eq!(
            user_prompt("flood deaths", &summaries),
            "User Query: flood deaths\n\nNews Summaries:\n\
             Source: The Kathmandu Post\nLink: https://kathmandupost.com/a\nSummary: 12 dead\n\n\
             Source: Nepali Times\nLink: https://nepalitimes.com/b\nSummary: 10 dead"
        );
    }

    #[test]
    fn system_prompt_follows_mode() {
        assert!(system_prompt(true).contains("inline links"));
        assert!(system_prompt(false).contains("Plain text only"));
        assert!(system_prompt(false).contains("use tables"));
    }

    #[tokio::test]
    async fn plain_mode_strips_markup_from_writer_output() {
        let writer = MockWriter::answering(
            "**According to** [Nepali Times](https://nepalitimes.com/b):\n* 10 dead",
        );
        let answer = synthesize(&writer, "q", &[], false, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(
            answer,
            "According to Nepali Times (https://nepalitimes.com/b):\n1. 10 dead"
        );
    }

    #[tokio::test]
    async fn empty_or_failed_answer_is_none() {
        let blank = MockWriter::answering("  \n ");
        assert!(synthesize(&blank, "q", &[], true, Duration::from_secs(1)).await.is_none());

        let failing = MockWriter::failing("rate limited");
        assert!(synthesize(&failing, "q", &[], true, Duration::from_secs(1)).await.is_none());
    }
}
