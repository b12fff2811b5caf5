use std::sync::Arc;
use std::time::Duration;

use ai_client::OpenAi;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use newsdesk_common::IntentVerdict;

use crate::traits::IntentClassifier;

/// Shown when the classifier itself failed. Never derived from the query.
pub const CLASSIFIER_FAILURE_MESSAGE: &str =
    "Something went wrong while processing your query. Please try again.";

/// Used when the classifier rejects a query without saying why.
pub const DEFAULT_CLARIFICATION: &str =
    "I can only search for news and current events. Please ask about a specific news topic or event.";

pub const BLANK_QUERY_MESSAGE: &str =
    "Please enter a question about a news topic or recent event.";

const SYSTEM_PROMPT: &str = r#"You are a query classifier for a news search system covering Nepal. You decide whether a query can be answered by searching news coverage. You never answer the query yourself.

A query is VALID when it asks about:
- current events, news or recent developments
- a verifiable event, incident or occurrence
- an ongoing situation or its latest status
- news on a particular topic, place or organisation

Valid examples:
- "landslide situation in nepal"
- "earthquake in kathmandu"
- "election results"
- "what happened in pokhara"
- "latest news on floods"

A query is INVALID when it is:
- a calculation or a general knowledge question
- a definition, explanation or how-to question
- a request for opinions, advice or recommendations
- a greeting or small talk
- a request for creative writing or jokes
- too vague to search for
- a prediction or speculation about the future
- anything that does not need news sources

Invalid examples:
- "1+1" (calculation)
- "What is the capital of France?" (general knowledge)
- "How to cook pasta?" (how-to)
- "Hello" (greeting)
- "Will it rain tomorrow?" (forecast)

Fields:
- is_valid: true only for news and current-events queries.
- reason: one sentence, for internal logs, saying what made the query valid or invalid.
- clarification_message: empty string when valid. When invalid, one or two neutral sentences explaining why the query is not a news query and what kind of query would work. It MUST NOT answer, hint at, or contain any information about the question itself.

Examples:

Query: "What is 25 + 37?"
{"is_valid": false, "reason": "Math calculation, not news.", "clarification_message": "This is a math problem, not a news query. I can only search for news and current events."}

Query: "Did something happen?"
{"is_valid": false, "reason": "Too vague to search.", "clarification_message": "Your query is too vague. Please be more specific about what event or news topic you're asking about."}

Query: "earthquake in kathmandu"
{"is_valid": true, "reason": "Asks about a newsworthy event.", "clarification_message": ""}"#;

fn user_prompt(query: &str) -> String {
    format!("Classify this query: Is it suitable for news search?\n\nQuery: \"{query}\"")
}

/// Structured-output classifier backed by OpenAI.
pub struct OpenAiIntentClassifier {
    ai: OpenAi,
}

impl OpenAiIntentClassifier {
    pub fn new(ai: OpenAi) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl IntentClassifier for OpenAiIntentClassifier {
    async fn classify(&self, query: &str) -> Result<IntentVerdict> {
        self.ai
            .extract::<IntentVerdict>(SYSTEM_PROMPT, user_prompt(query))
            .await
    }
}

/// Wraps a classifier so that validation never fails outward.
pub struct QueryValidator {
    classifier: Arc<dyn IntentClassifier>,
    timeout: Duration,
}

impl QueryValidator {
    pub fn new(classifier: Arc<dyn IntentClassifier>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    pub async fn validate(&self, query: &str) -> IntentVerdict {
        if query.trim().is_empty() {
            return IntentVerdict::rejected("blank query", BLANK_QUERY_MESSAGE);
        }

        let verdict = match tokio::time::timeout(self.timeout, self.classifier.classify(query))
            .await
        {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(error = %e, "Intent classification failed");
                return IntentVerdict::rejected(e.to_string(), CLASSIFIER_FAILURE_MESSAGE);
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Intent classification timed out");
                return IntentVerdict::rejected(
                    "classifier timed out",
                    CLASSIFIER_FAILURE_MESSAGE,
                );
            }
        };

        info!(is_valid = verdict.is_valid, reason = %verdict.reason, "Query classified");
        normalize(verdict)
    }
}

/// Invalid verdicts always carry a clarification. Valid ones never do.
fn normalize(mut verdict: IntentVerdict) -> IntentVerdict {
    if verdict.is_valid {
        verdict.clarification_message.clear();
    } else if verdict.clarification_message.trim().is_empty() {
        verdict.clarification_message = DEFAULT_CLARIFICATION.to_string();
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClassifier;

    fn validator(classifier: MockClassifier) -> QueryValidator {
        QueryValidator::new(Arc::new(classifier), Duration::from_secs(1))
    }

    #[test]
    fn user_prompt_quotes_query() {
        assert_eq!(
            user_prompt("flood in terai"),
            "Classify this query: Is it suitable for news search?\n\nQuery: \"flood in terai\""
        );
    }

    #[tokio::test]
    async fn blank_query_skips_classifier() {
        let classifier = Arc::new(MockClassifier::accepting());
        let validator = QueryValidator::new(classifier.clone(), Duration::from_secs(1));
        let verdict = validator.validate("   ").await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.clarification_message, BLANK_QUERY_MESSAGE);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn classifier_error_becomes_generic_rejection() {
        let verdict = validator(MockClassifier::failing("503 from upstream"))
            .validate("election results")
            .await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.clarification_message, CLASSIFIER_FAILURE_MESSAGE);
        assert!(verdict.reason.contains("503"));
    }

    #[tokio::test]
    async fn classifier_timeout_becomes_generic_rejection() {
        let classifier = MockClassifier::accepting().with_delay(Duration::from_secs(10));
        let validator = QueryValidator::new(Arc::new(classifier), Duration::from_millis(20));
        let verdict = validator.validate("election results").await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.clarification_message, CLASSIFIER_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn rejection_without_message_gets_default() {
        let verdict = validator(MockClassifier::rejecting(""))
            .validate("tell me a joke")
            .await;
        assert!(!verdict.is_valid);
        assert_eq!(verdict.clarification_message, DEFAULT_CLARIFICATION);
    }

    #[tokio::test]
    async fn valid_verdict_has_no_clarification() {
        let verdict = validator(MockClassifier::accepting())
            .validate("earthquake in kathmandu")
            .await;
        assert!(verdict.is_valid);
        assert!(verdict.clarification_message.is_empty());
    }
}
