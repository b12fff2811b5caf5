pub mod error;
pub mod openai;
pub mod traits;
mod util;

pub use error::AiError;
pub use openai::{OpenAi, StructuredOutput};
pub use traits::{Agent, OutputBuilder, PromptBuilder};
pub use util::truncate_to_char_boundary;
