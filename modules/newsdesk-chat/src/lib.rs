pub mod bus;
pub mod format;
pub mod orchestrator;
pub mod publisher;
pub mod search;
pub mod state;
pub mod summarizer;
pub mod synthesizer;
pub mod traits;
pub mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use bus::{ChannelLease, SessionBus, Subscription};
pub use orchestrator::{ChatPipeline, PipelineDeps, RunReport};
pub use publisher::{NoopSink, ProgressSink, PublishSink};
pub use search::SerperNewsSearch;
pub use state::{Outcome, RunState};
pub use summarizer::OpenAiSummarizer;
pub use synthesizer::OpenAiAnswerWriter;
pub use traits::{
    AnswerWriter, ArticleSummarizer, IntentClassifier, NewsSearch, SessionStore, TranscriptStore,
};
pub use validator::{OpenAiIntentClassifier, QueryValidator};
